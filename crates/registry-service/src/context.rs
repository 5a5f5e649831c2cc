//! Request context carrying the authenticated account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registry_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built from the stored account after token validation, never from
/// request input, and passed into service methods so that every
/// operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated username.
    pub username: String,
    /// The account's current role.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
            request_time: Utc::now(),
        }
    }

    /// Whether the current account may mutate data.
    pub fn can_modify(&self) -> bool {
        self.role.can_modify()
    }
}

impl From<&User> for RequestContext {
    fn from(user: &User) -> Self {
        Self::new(user.username.clone(), user.role)
    }
}
