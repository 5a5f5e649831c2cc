//! Export history entity model.

use chrono::{DateTime, Utc};
use registry_core::traits::Record;
use registry_core::types::ExportId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::audit::AuditAction;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    /// `.xlsx` workbook.
    Excel,
    /// `.docx` document.
    Word,
}

impl ExportKind {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Word => "docx",
        }
    }

    /// MIME type of the generated file.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Audit tag recorded for this kind.
    pub fn audit_action(&self) -> AuditAction {
        match self {
            Self::Excel => AuditAction::ExportExcel,
            Self::Word => AuditAction::ExportWord,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excel => write!(f, "Excel"),
            Self::Word => write!(f, "Word"),
        }
    }
}

/// One entry of the export history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Entry id.
    pub id: String,
    /// Name of the file written to the exports directory.
    #[serde(alias = "nome_arquivo")]
    pub output_file_name: String,
    /// Output format.
    #[serde(alias = "tipo")]
    pub kind: ExportKind,
    /// Who requested the export.
    #[serde(alias = "usuario")]
    pub actor: String,
    /// When the export was produced.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Number of exported documents.
    #[serde(default, alias = "quantidade_documentos")]
    pub document_count: usize,
    /// Copy of the exported documents, when snapshots are enabled.
    #[serde(default, alias = "dados", skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Vec<Record>>,
}

impl ExportRecord {
    /// Create a history entry for an export that just completed.
    pub fn new(
        output_file_name: impl Into<String>,
        kind: ExportKind,
        actor: impl Into<String>,
        document_count: usize,
        snapshot: Option<Vec<Record>>,
    ) -> Self {
        Self {
            id: ExportId::new().to_string(),
            output_file_name: output_file_name.into(),
            kind,
            actor: actor.into(),
            timestamp: Utc::now(),
            document_count,
            snapshot,
        }
    }
}
