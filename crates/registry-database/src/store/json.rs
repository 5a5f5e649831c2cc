//! One JSON array file per collection.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::traits::{Collection, Record, RecordStore};

/// File-backed record store.
///
/// Each collection lives in `<dir>/<name>.json`. Saves go through a
/// temporary sibling that is renamed over the target, so a failed save
/// never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create records directory '{}'", dir.display()),
                e,
            )
        })?;
        info!(dir = %dir.display(), "JSON record store opened");
        Ok(Self { dir })
    }

    /// Directory holding the collection files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }

    fn temp_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", collection.name()))
    }

    /// Copy a partly readable file aside before entries are dropped from
    /// it. Fails the load when the copy cannot be made.
    async fn preserve_copy(&self, path: &Path) -> AppResult<()> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let backup = PathBuf::from(format!("{}.rejected-{stamp}", path.display()));
        if tokio::fs::try_exists(&backup).await? {
            return Ok(());
        }
        tokio::fs::copy(path, &backup).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to copy '{}' aside", path.display()),
                e,
            )
        })?;
        warn!(backup = %backup.display(), "Original collection file preserved");
        Ok(())
    }

    /// Move an unreadable file aside so the next save cannot clobber it.
    async fn quarantine(&self, path: &Path) {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let backup = PathBuf::from(format!("{}.corrupt-{stamp}", path.display()));
        match tokio::fs::rename(path, &backup).await {
            Ok(()) => warn!(backup = %backup.display(), "Corrupt collection moved aside"),
            Err(e) => error!(
                path = %path.display(),
                error = %e,
                "Failed to move corrupt collection aside"
            ),
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn load(&self, collection: Collection) -> AppResult<Vec<Record>> {
        let path = self.path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read '{}'", path.display()),
                    e,
                ));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let values: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    collection = %collection,
                    path = %path.display(),
                    error = %e,
                    "Collection file is corrupt, starting empty"
                );
                self.quarantine(&path).await;
                return Ok(Vec::new());
            }
        };

        let total = values.len();
        let records: Vec<Record> = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        if records.len() != total {
            warn!(
                collection = %collection,
                skipped = total - records.len(),
                "Collection holds non-object entries, keeping a copy of the file"
            );
            self.preserve_copy(&path).await?;
        }

        debug!(collection = %collection, count = records.len(), "Collection loaded");
        Ok(records)
    }

    async fn save(&self, collection: Collection, records: &[Record]) -> AppResult<()> {
        let path = self.path(collection);
        let temp = self.temp_path(collection);
        let bytes = serde_json::to_vec_pretty(records)?;

        let write = async {
            let mut file = tokio::fs::File::create(&temp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp, &path).await
        };

        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to save '{}'", path.display()),
                e,
            ));
        }

        debug!(collection = %collection, count = records.len(), "Collection saved");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let meta = tokio::fs::metadata(&self.dir).await?;
        Ok(meta.is_dir() && !meta.permissions().readonly())
    }

    async fn close(&self) {
        info!("JSON record store closed");
    }
}
