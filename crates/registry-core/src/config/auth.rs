//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Shipped value of `auth.jwt_secret`; it must be replaced before serving.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4); 0 disables the strength check.
    #[serde(default = "default_password_strength")]
    pub password_min_strength: u8,
    /// Administrator created on startup when no users exist.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the first administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Login name.
    pub username: String,
    /// Plaintext password; hashed before it is stored.
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl(),
            password_min_length: default_password_min(),
            password_min_strength: default_password_strength(),
            bootstrap_admin: None,
        }
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    480
}

fn default_password_min() -> usize {
    8
}

fn default_password_strength() -> u8 {
    2
}
