//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// A registered account.
///
/// The password hash is part of the persisted record; API responses use
/// a separate DTO that omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique login name.
    #[serde(alias = "usuario")]
    pub username: String,
    /// Argon2id PHC string; imported accounts may hold a bcrypt hash until
    /// their next login.
    #[serde(alias = "senha")]
    pub password_hash: String,
    /// Authorization tier.
    #[serde(alias = "tipo")]
    pub role: UserRole,
    /// When the account was registered. Absent on imported accounts.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::timestamp::deserialize_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a new account from registration data.
    pub fn new(data: CreateUser) -> Self {
        Self {
            username: data.username,
            password_hash: data.password_hash,
            role: data.role,
            created_at: Some(Utc::now()),
        }
    }

    /// Whether this account may mutate documents, uploads and users.
    pub fn can_modify(&self) -> bool {
        self.role.can_modify()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}
