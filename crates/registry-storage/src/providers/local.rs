//! Flat local directory of named files.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_entity::upload::UploadInfo;

/// A single directory holding files addressed by bare filename.
///
/// Names are resolved strictly inside the directory; anything that could
/// climb out of it is rejected with a validation error.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    root: PathBuf,
}

/// Outcome of a create-new write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created.
    Created,
    /// A file with that name already exists; nothing was written.
    AlreadyExists,
}

fn not_found(name: &str) -> AppError {
    AppError::not_found(format!("File '{name}' not found"))
}

impl LocalDirectory {
    /// Open the directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bare filename to a path inside the directory.
    pub fn resolve(&self, name: &str) -> AppResult<PathBuf> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
            || name.contains("..");
        if invalid {
            return Err(AppError::validation(format!("Invalid file name '{name}'")));
        }
        Ok(self.root.join(name))
    }

    /// Whether a regular file with this name exists.
    pub async fn exists(&self, name: &str) -> AppResult<bool> {
        let path = self.resolve(name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat file: {name}"),
                e,
            )),
        }
    }

    /// Write `data` only if no file with this name exists yet.
    ///
    /// Uses `create_new`, so two concurrent writers of the same name can
    /// never overwrite each other.
    pub async fn write_new(&self, name: &str, data: &[u8]) -> AppResult<WriteOutcome> {
        let path = self.resolve(name)?;
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                return Ok(WriteOutcome::AlreadyExists);
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create file: {name}"),
                    e,
                ));
            }
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {name}"),
                e,
            ));
        }

        debug!(name, bytes = data.len(), "Wrote file");
        Ok(WriteOutcome::Created)
    }

    /// Write `data`, replacing any existing file with this name.
    pub async fn write(&self, name: &str, data: &[u8]) -> AppResult<()> {
        let path = self.resolve(name)?;
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {name}"),
                e,
            )
        })?;
        debug!(name, bytes = data.len(), "Wrote file");
        Ok(())
    }

    /// Read a whole file.
    pub async fn read(&self, name: &str) -> AppResult<Bytes> {
        let path = self.resolve(name)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                not_found(name)
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {name}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Delete a file. NotFound if it does not exist.
    pub async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.resolve(name)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                not_found(name)
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete file: {name}"),
                    e,
                )
            }
        })?;
        debug!(name, "Deleted file");
        Ok(())
    }

    /// List regular files, sorted by name.
    pub async fn list(&self) -> AppResult<Vec<UploadInfo>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {}", self.root.display()),
                e,
            )
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(meta) = unless_vanished(entry.metadata().await)? else {
                debug!(entry = ?entry.file_name(), "File removed while listing");
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let modified_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            files.push(UploadInfo {
                name,
                size: meta.len(),
                modified_at,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Check that the directory is still present.
    pub async fn health_check(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

/// `None` when the entry was removed between listing and inspection.
fn unless_vanished<T>(result: std::io::Result<T>) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalDirectory::open(dir.path()).await.unwrap();

        assert_eq!(local.write_new("a.txt", b"one").await.unwrap(), WriteOutcome::Created);
        assert_eq!(
            local.write_new("a.txt", b"two").await.unwrap(),
            WriteOutcome::AlreadyExists
        );
        assert_eq!(local.read("a.txt").await.unwrap(), Bytes::from_static(b"one"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalDirectory::open(dir.path()).await.unwrap();

        for name in ["", "..", "../x", "a/b", "a\\b", "x..y"] {
            let err = local.resolve(name).unwrap_err();
            assert!(err.is(ErrorKind::Validation), "{name}");
        }
        assert!(local.resolve("photo.png").is_ok());
    }

    #[tokio::test]
    async fn test_list_sorted_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalDirectory::open(dir.path()).await.unwrap();
        local.write("b.txt", b"bb").await.unwrap();
        local.write("a.txt", b"a").await.unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let names: Vec<String> = local.list().await.unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        local.delete("a.txt").await.unwrap();
        assert!(local.delete("a.txt").await.unwrap_err().is(ErrorKind::NotFound));
        assert!(!local.exists("a.txt").await.unwrap());
    }

    #[test]
    fn test_vanished_entries_are_skipped() {
        let gone: std::io::Result<u64> = Err(std::io::Error::from(IoErrorKind::NotFound));
        assert!(unless_vanished(gone).unwrap().is_none());

        let denied: std::io::Result<u64> = Err(std::io::Error::from(IoErrorKind::PermissionDenied));
        assert!(unless_vanished(denied).is_err());

        assert_eq!(unless_vanished(Ok(7u64)).unwrap(), Some(7));
    }
}
