//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use registry_entity::user::UserRole;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[serde(alias = "usuario")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[serde(alias = "senha")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Account registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    /// Desired username.
    #[serde(alias = "usuario")]
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    /// Plain-text password, checked against the password policy.
    #[serde(alias = "senha")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Role; defaults to viewer.
    #[serde(default, alias = "tipo")]
    pub role: Option<UserRole>,
}

/// Query string of the export endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportQuery {
    /// Output file name; a timestamped default is used when absent.
    pub name: Option<String>,
    /// Whether the Word export appends the media section.
    pub media: Option<bool>,
}
