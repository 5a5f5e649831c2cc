//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registry_entity::user::{User, UserRole};
use registry_service::RequestContext;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// The authenticated account.
    pub user: UserResponse,
}

/// Account summary; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Username.
    pub username: String,
    /// Role.
    pub role: UserRole,
    /// Registration time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// The caller's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// Username.
    pub username: String,
    /// Role.
    pub role: UserRole,
    /// Whether the role may mutate data.
    pub can_modify: bool,
}

impl From<&RequestContext> for MeResponse {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            username: ctx.username.clone(),
            role: ctx.role,
            can_modify: ctx.can_modify(),
        }
    }
}

/// Result of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Name the file was stored under.
    pub filename: String,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Active record backend.
    pub backend: String,
    /// Whether the record store answered.
    pub store: bool,
    /// Whether the upload directory is reachable.
    pub uploads: bool,
}
