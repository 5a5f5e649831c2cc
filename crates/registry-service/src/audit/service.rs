//! Fire-and-forget audit recording.

use std::sync::Arc;

use tracing::warn;

use registry_auth::rbac::RbacEnforcer;
use registry_core::error::AppError;
use registry_database::repositories::AuditLogRepository;
use registry_entity::audit::{AuditAction, AuditEntry};

use crate::context::RequestContext;

/// Records user actions in the bounded audit log.
#[derive(Debug, Clone)]
pub struct AuditService {
    audit_repo: Arc<AuditLogRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(audit_repo: Arc<AuditLogRepository>, rbac: Arc<RbacEnforcer>) -> Self {
        Self { audit_repo, rbac }
    }

    /// Append an entry. Persistence failures are logged and swallowed so
    /// that auditing never fails the action being audited.
    pub async fn record(&self, actor: &str, action: AuditAction, details: impl Into<String>) {
        let entry = AuditEntry::new(actor, action, details);
        if let Err(e) = self.audit_repo.append(&entry).await {
            warn!(
                actor = %actor,
                action = %action,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }

    /// Retained entries in chronological order.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<AuditEntry>, AppError> {
        self.rbac.require_modify(ctx.role, "read the audit log")?;
        self.audit_repo.find_all().await
    }
}
