//! Directory layout and upload limits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory (relative to `data_root`) holding the JSON collections.
    #[serde(default = "default_records_dir")]
    pub records_dir: String,
    /// Directory (relative to `data_root`) holding uploaded media.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Directory (relative to `data_root`) holding generated exports.
    #[serde(default = "default_exports_dir")]
    pub exports_dir: String,
    /// Maximum request body size in bytes (default 500 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl StorageConfig {
    /// Absolute-or-relative path of the JSON collections directory.
    pub fn records_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.records_dir)
    }

    /// Path of the uploads directory.
    pub fn uploads_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.uploads_dir)
    }

    /// Path of the exports directory.
    pub fn exports_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.exports_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            records_dir: default_records_dir(),
            uploads_dir: default_uploads_dir(),
            exports_dir: default_exports_dir(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_records_dir() -> String {
    "records".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_exports_dir() -> String {
    "exports".to_string()
}

fn default_max_upload() -> u64 {
    524_288_000 // 500 MB
}
