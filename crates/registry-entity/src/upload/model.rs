//! Upload listing entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about one stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    /// Stored filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}
