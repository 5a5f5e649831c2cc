//! Registration, listing and removal of accounts.

use std::sync::Arc;

use tracing::info;

use registry_auth::password::{PasswordHasher, PasswordValidator};
use registry_auth::rbac::RbacEnforcer;
use registry_core::config::auth::BootstrapAdmin;
use registry_core::error::AppError;
use registry_database::repositories::UserRepository;
use registry_entity::audit::AuditAction;
use registry_entity::user::{CreateUser, User, UserRole};

use crate::audit::AuditService;
use crate::context::RequestContext;

const MAX_USERNAME_LEN: usize = 64;

/// Handles account management.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    rbac: Arc<RbacEnforcer>,
    audit: Arc<AuditService>,
}

/// Reject usernames that are empty, too long, or padded with whitespace.
fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if username.trim() != username {
        return Err(AppError::validation(
            "Username must not start or end with whitespace",
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        rbac: Arc<RbacEnforcer>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            rbac,
            audit,
        }
    }

    /// Register a new account. Requires the modify role.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        self.rbac.require_modify(ctx.role, "register users")?;
        let user = self.create_account(username, password, role).await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::RegisterUser,
                format!("User '{}' registered as {}", user.username, user.role),
            )
            .await;
        info!(actor = %ctx.username, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// All accounts in registration order.
    pub async fn list(&self, _ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        self.user_repo.find_all().await
    }

    /// Remove an account. Requires the modify role; nobody may delete
    /// their own account.
    pub async fn delete(&self, ctx: &RequestContext, username: &str) -> Result<(), AppError> {
        self.rbac.require_modify(ctx.role, "delete users")?;
        if ctx.username == username {
            return Err(AppError::authorization("You cannot delete your own account"));
        }

        self.user_repo.delete(username).await?;

        self.audit
            .record(
                &ctx.username,
                AuditAction::DeleteUser,
                format!("User '{username}' deleted"),
            )
            .await;
        info!(actor = %ctx.username, username = %username, "User deleted");
        Ok(())
    }

    /// Create the configured administrator when no accounts exist yet.
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_bootstrap_admin(
        &self,
        bootstrap: Option<&BootstrapAdmin>,
    ) -> Result<bool, AppError> {
        let Some(bootstrap) = bootstrap else {
            return Ok(false);
        };
        if self.user_repo.count().await? > 0 {
            return Ok(false);
        }

        let user = self
            .create_account(
                &bootstrap.username,
                &bootstrap.password,
                UserRole::Administrator,
            )
            .await
            .map_err(|e| {
                AppError::configuration(format!("Invalid bootstrap administrator: {}", e.message))
            })?;

        info!(username = %user.username, "Bootstrap administrator created");
        Ok(true)
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        validate_username(username)?;
        self.validator.validate(password, &[username])?;

        let user = User::new(CreateUser {
            username: username.to_string(),
            password_hash: self.hasher.hash_password(password)?,
            role,
        });
        self.user_repo.create(&user).await?;
        Ok(user)
    }
}
