//! CRUD over archived document metadata.

use std::sync::Arc;

use tracing::info;

use registry_auth::rbac::RbacEnforcer;
use registry_core::error::AppError;
use registry_core::traits::Record;
use registry_database::repositories::DocumentRepository;
use registry_entity::audit::AuditAction;
use registry_entity::document::Document;

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Handles document metadata operations.
#[derive(Debug, Clone)]
pub struct DocumentService {
    document_repo: Arc<DocumentRepository>,
    rbac: Arc<RbacEnforcer>,
    audit: Arc<AuditService>,
}

fn label(document: &Document) -> &str {
    document.display_name().unwrap_or(document.id.as_str())
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        rbac: Arc<RbacEnforcer>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            document_repo,
            rbac,
            audit,
        }
    }

    /// Add a document built from arbitrary metadata.
    pub async fn add(&self, ctx: &RequestContext, record: Record) -> Result<Document, AppError> {
        self.rbac.require_modify(ctx.role, "add documents")?;
        let document = self.document_repo.add(Document::from_record(record)?).await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::AddDocument,
                format!("Document '{}' added", label(&document)),
            )
            .await;
        info!(actor = %ctx.username, id = %document.id, "Document added");
        Ok(document)
    }

    /// All documents in insertion order.
    pub async fn list(&self, _ctx: &RequestContext) -> Result<Vec<Document>, AppError> {
        self.document_repo.find_all().await
    }

    /// A single document.
    pub async fn get(&self, _ctx: &RequestContext, id: &str) -> Result<Document, AppError> {
        self.document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document '{id}' not found")))
    }

    /// Replace the metadata of an existing document.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        record: Record,
    ) -> Result<Document, AppError> {
        self.rbac.require_modify(ctx.role, "edit documents")?;
        let document = self
            .document_repo
            .update(id, Document::from_record(record)?)
            .await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::EditDocument,
                format!("Document '{}' edited", label(&document)),
            )
            .await;
        info!(actor = %ctx.username, id = %id, "Document updated");
        Ok(document)
    }

    /// Remove a document.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
        self.rbac.require_modify(ctx.role, "delete documents")?;
        let existing = self.document_repo.find_by_id(id).await?;
        self.document_repo.delete(id).await?;

        let name = existing
            .as_ref()
            .map(label)
            .unwrap_or(id)
            .to_string();
        self.audit
            .record(
                &ctx.username,
                AuditAction::DeleteDocument,
                format!("Document '{name}' deleted"),
            )
            .await;
        info!(actor = %ctx.username, id = %id, "Document deleted");
        Ok(())
    }
}
