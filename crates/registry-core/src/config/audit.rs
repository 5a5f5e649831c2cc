//! Audit log retention configuration.

use serde::{Deserialize, Serialize};

/// Audit log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Number of newest entries retained after every write.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    1000
}
