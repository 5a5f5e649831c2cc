//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use registry_core::config::AppConfig;
use registry_core::traits::RecordStore;
use registry_service::{
    AuditService, AuthService, DocumentService, ExportService, UploadService, UserService,
};
use registry_storage::UploadStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Record persistence backend
    pub store: Arc<dyn RecordStore>,
    /// Upload directory
    pub uploads: Arc<UploadStore>,

    /// Login and token resolution
    pub auth_service: Arc<AuthService>,
    /// Account management
    pub user_service: Arc<UserService>,
    /// Document CRUD
    pub document_service: Arc<DocumentService>,
    /// Media uploads
    pub upload_service: Arc<UploadService>,
    /// Excel and Word exports
    pub export_service: Arc<ExportService>,
    /// Audit log
    pub audit_service: Arc<AuditService>,
}
