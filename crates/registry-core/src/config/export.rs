//! Export rendering configuration.

use serde::{Deserialize, Serialize};

/// Settings for spreadsheet and Word exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Store the exported document snapshot in the export history.
    #[serde(default = "default_true")]
    pub include_snapshot: bool,
    /// Width of embedded images in the Word export, in inches.
    #[serde(default = "default_image_width")]
    pub image_width_inches: f64,
    /// Heading of the Word export.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_snapshot: true,
            image_width_inches: default_image_width(),
            title: default_title(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_image_width() -> f64 {
    3.0
}

fn default_title() -> String {
    "Documentos Arquivísticos".to_string()
}
