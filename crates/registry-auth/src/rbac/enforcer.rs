//! The modify/read-only role check.

use registry_core::error::AppError;
use registry_entity::user::UserRole;

/// Enforces the two-tier authorization model.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// True only for administrators and editors.
    pub fn authorize(&self, role: UserRole) -> bool {
        role.can_modify()
    }

    /// Reject with an authorization error unless `role` may modify data.
    pub fn require_modify(&self, role: UserRole, action: &str) -> Result<(), AppError> {
        if self.authorize(role) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' is not allowed to {action}"
            )))
        }
    }
}
