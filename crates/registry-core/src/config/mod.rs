//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default so an empty configuration yields a
//! runnable development setup backed by JSON files.

pub mod app;
pub mod audit;
pub mod auth;
pub mod database;
pub mod export;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::audit::AuditConfig;
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::export::ExportConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload, export, and record directories.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Audit log retention.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Export rendering settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `REGISTRY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REGISTRY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Reject configurations that would start an insecure or broken server.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.backend = \"postgres\"",
            ));
        }
        if self.auth.jwt_secret == auth::PLACEHOLDER_JWT_SECRET {
            return Err(AppError::configuration(
                "auth.jwt_secret still holds the placeholder value; set REGISTRY__AUTH__JWT_SECRET",
            ));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 16 characters",
            ));
        }
        if self.audit.max_entries == 0 {
            return Err(AppError::configuration("audit.max_entries must be positive"));
        }
        Ok(())
    }
}
