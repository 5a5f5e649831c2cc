//! Credential checks and token-bound identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use registry_auth::jwt::{JwtDecoder, JwtEncoder};
use registry_auth::password::PasswordHasher;
use registry_core::error::AppError;
use registry_database::repositories::UserRepository;
use registry_entity::audit::{AuditAction, UNKNOWN_ACTOR};
use registry_entity::user::User;

use crate::audit::AuditService;
use crate::context::RequestContext;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The authenticated account.
    pub user: User,
}

/// Issues tokens for valid credentials and resolves tokens back to accounts.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    audit: Arc<AuditService>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
            decoder,
            audit,
        }
    }

    /// Check credentials and issue an access token.
    ///
    /// Both outcomes are audited; failures for unknown accounts are
    /// recorded under the `unknown` actor.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            warn!(username = %username, "Login for unknown user");
            self.audit
                .record(
                    UNKNOWN_ACTOR,
                    AuditAction::LoginFailed,
                    format!("Unknown user '{username}'"),
                )
                .await;
            return Err(AppError::authentication(BAD_CREDENTIALS));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(username = %username, "Login with wrong password");
            self.audit
                .record(username, AuditAction::LoginFailed, "Wrong password")
                .await;
            return Err(AppError::authentication(BAD_CREDENTIALS));
        }

        if self.hasher.needs_rehash(&user.password_hash) {
            self.upgrade_hash(&user.username, password).await;
        }

        let issued = self.encoder.issue(&user.username)?;
        self.audit
            .record(&user.username, AuditAction::Login, "Login succeeded")
            .await;
        info!(username = %user.username, role = %user.role, "User logged in");

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Store an Argon2id hash in place of an older format. Failures are
    /// logged; the login itself already succeeded.
    async fn upgrade_hash(&self, username: &str, password: &str) {
        let result = match self.hasher.hash_password(password) {
            Ok(hash) => self.user_repo.update_password_hash(username, &hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(username = %username, "Password hash upgraded to Argon2id"),
            Err(e) => warn!(username = %username, error = %e, "Failed to upgrade password hash"),
        }
    }

    /// Validate a bearer token and load the account it names.
    ///
    /// The role comes from the stored account, so a deleted account is
    /// rejected even while its token is still unexpired.
    pub async fn authenticate(&self, token: &str) -> Result<RequestContext, AppError> {
        let claims = self.decoder.decode(token)?;
        let user = self
            .user_repo
            .find_by_username(claims.username())
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;
        Ok(RequestContext::from(&user))
    }
}
