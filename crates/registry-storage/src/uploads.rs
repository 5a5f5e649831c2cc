//! Media upload store.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_entity::upload::UploadInfo;

use crate::providers::local::{LocalDirectory, WriteOutcome};
use crate::sanitize::{extension_of, sanitize_filename};

/// Extensions accepted for upload (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", // images
    "mp4", "avi", "mov", "wmv", "webm", // video
    "mp3", "wav", "ogg", "m4a", // audio
    "pdf", "doc", "docx", "txt", // documents
];

/// Extensions the Word export embeds as pictures.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

const MAX_NAME_ATTEMPTS: usize = 8;

/// Whether `filename` has an allowed extension.
pub fn validate_extension(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `filename` names an image the Word export can embed.
pub fn is_image(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type guessed from the extension.
pub fn guess_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// `name_<YYYYMMDDHHMMSSffffff>.ext`
fn suffixed_name(name: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    match name.rsplit_once('.') {
        Some((base, ext)) => format!("{base}_{stamp}.{ext}"),
        None => format!("{name}_{stamp}"),
    }
}

/// Stores uploaded media by sanitized, unique filename.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: LocalDirectory,
}

impl UploadStore {
    /// Open the upload directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        Ok(Self {
            dir: LocalDirectory::open(root).await?,
        })
    }

    /// Validate, sanitize and persist `data`, returning the stored name.
    ///
    /// An existing file is never overwritten: on a name collision a
    /// timestamp suffix is inserted before the extension.
    pub async fn store(&self, filename: &str, data: &[u8]) -> AppResult<String> {
        if !validate_extension(filename) {
            return Err(AppError::validation(format!(
                "File type not allowed: '{filename}'. Allowed extensions: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let sanitized = sanitize_filename(filename);
        if !validate_extension(&sanitized) {
            return Err(AppError::validation(format!(
                "File name '{filename}' has no usable extension"
            )));
        }

        let mut candidate = sanitized.clone();
        for _ in 0..MAX_NAME_ATTEMPTS {
            match self.dir.write_new(&candidate, data).await? {
                WriteOutcome::Created => {
                    info!(name = %candidate, bytes = data.len(), "Upload stored");
                    return Ok(candidate);
                }
                WriteOutcome::AlreadyExists => {
                    warn!(name = %candidate, "Upload name taken, adding suffix");
                    candidate = suffixed_name(&sanitized);
                }
            }
        }

        Err(AppError::conflict(format!(
            "Could not find a free name for '{sanitized}'"
        )))
    }

    /// Read an upload and its MIME type.
    pub async fn fetch(&self, filename: &str) -> AppResult<(Bytes, String)> {
        let data = self.dir.read(filename).await?;
        Ok((data, guess_mime(filename)))
    }

    /// Path of an existing upload, for streaming responses.
    pub async fn path_of(&self, filename: &str) -> AppResult<PathBuf> {
        if !self.dir.exists(filename).await? {
            return Err(AppError::not_found(format!("File '{filename}' not found")));
        }
        self.dir.resolve(filename)
    }

    /// Whether an upload with this name exists. Invalid names are absent.
    pub async fn contains(&self, filename: &str) -> bool {
        self.dir.exists(filename).await.unwrap_or(false)
    }

    /// All uploads, sorted by name.
    pub async fn list(&self) -> AppResult<Vec<UploadInfo>> {
        self.dir.list().await
    }

    /// Remove an upload.
    pub async fn delete(&self, filename: &str) -> AppResult<()> {
        self.dir.delete(filename).await?;
        info!(name = %filename, "Upload deleted");
        Ok(())
    }

    /// Check that the upload directory is still present.
    pub async fn health_check(&self) -> bool {
        self.dir.health_check().await
    }
}
