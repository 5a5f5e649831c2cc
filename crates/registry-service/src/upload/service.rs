//! Upload, listing, and removal of media files.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use registry_auth::rbac::RbacEnforcer;
use registry_core::error::AppError;
use registry_entity::audit::AuditAction;
use registry_entity::upload::UploadInfo;
use registry_storage::UploadStore;

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Handles media uploads.
#[derive(Debug, Clone)]
pub struct UploadService {
    uploads: Arc<UploadStore>,
    rbac: Arc<RbacEnforcer>,
    audit: Arc<AuditService>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(uploads: Arc<UploadStore>, rbac: Arc<RbacEnforcer>, audit: Arc<AuditService>) -> Self {
        Self {
            uploads,
            rbac,
            audit,
        }
    }

    /// Store an uploaded file and return the name it was saved under.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        filename: &str,
        data: &[u8],
    ) -> Result<String, AppError> {
        self.rbac.require_modify(ctx.role, "upload files")?;
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let stored = self.uploads.store(filename, data).await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::UploadFile,
                format!("File '{stored}' uploaded"),
            )
            .await;
        info!(actor = %ctx.username, name = %stored, bytes = data.len(), "File uploaded");
        Ok(stored)
    }

    /// All uploads, sorted by name.
    pub async fn list(&self, _ctx: &RequestContext) -> Result<Vec<UploadInfo>, AppError> {
        self.uploads.list().await
    }

    /// Contents and MIME type of an upload.
    pub async fn fetch(
        &self,
        _ctx: &RequestContext,
        filename: &str,
    ) -> Result<(Bytes, String), AppError> {
        self.uploads.fetch(filename).await
    }

    /// Filesystem path of an upload, for range-capable streaming.
    pub async fn path_of(&self, _ctx: &RequestContext, filename: &str) -> Result<PathBuf, AppError> {
        self.uploads.path_of(filename).await
    }

    /// Remove an upload.
    pub async fn delete(&self, ctx: &RequestContext, filename: &str) -> Result<(), AppError> {
        self.rbac.require_modify(ctx.role, "delete uploads")?;
        self.uploads.delete(filename).await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::DeleteUpload,
                format!("File '{filename}' deleted"),
            )
            .await;
        info!(actor = %ctx.username, name = %filename, "Upload deleted");
        Ok(())
    }
}
