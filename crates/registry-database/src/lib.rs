//! # registry-database
//!
//! Persistence for the archive registry: the two [`RecordStore`]
//! implementations (JSON files and PostgreSQL), the migration runner, and
//! the repositories that the services use.
//!
//! [`RecordStore`]: registry_core::traits::RecordStore

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{JsonFileStore, PgRecordStore, open_store};
