//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use registry_core::types::AuditEntryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor recorded for failed logins of unknown accounts.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// Successful login.
    Login,
    /// Rejected login.
    LoginFailed,
    /// Account created.
    RegisterUser,
    /// Account removed.
    DeleteUser,
    /// Document added.
    AddDocument,
    /// Document replaced.
    EditDocument,
    /// Document removed.
    DeleteDocument,
    /// Media uploaded.
    UploadFile,
    /// Media removed.
    DeleteUpload,
    /// Spreadsheet export.
    ExportExcel,
    /// Word export.
    ExportWord,
}

impl AuditAction {
    /// The persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::RegisterUser => "REGISTER_USER",
            Self::DeleteUser => "DELETE_USER",
            Self::AddDocument => "ADD_DOCUMENT",
            Self::EditDocument => "EDIT_DOCUMENT",
            Self::DeleteDocument => "DELETE_DOCUMENT",
            Self::UploadFile => "UPLOAD_FILE",
            Self::DeleteUpload => "DELETE_UPLOAD",
            Self::ExportExcel => "EXPORT_EXCEL",
            Self::ExportWord => "EXPORT_WORD",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable audit log entry recording a user action.
///
/// `action` is kept as free text so tags written by older deployments
/// survive a load/save cycle unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id.
    pub id: String,
    /// Who performed the action.
    #[serde(alias = "usuario")]
    pub actor: String,
    /// Action tag.
    #[serde(alias = "acao")]
    pub action: String,
    /// Human-readable description.
    #[serde(default, alias = "detalhes")]
    pub details: String,
    /// When the action happened.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(actor: impl Into<String>, action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            id: AuditEntryId::new().to_string(),
            actor: actor.into(),
            action: action.as_str().to_string(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}
