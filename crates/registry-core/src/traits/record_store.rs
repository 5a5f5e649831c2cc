//! Persistence abstraction for the record collections.

use std::fmt;

use async_trait::async_trait;

use crate::result::AppResult;

/// A single schemaless record as it is persisted.
///
/// `serde_json` is built with `preserve_order`, so key order survives a
/// load/save cycle.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The named collections owned by a [`RecordStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Registered accounts.
    Users,
    /// Archived document metadata.
    Documents,
    /// Audit trail.
    AuditLog,
    /// Export history.
    Exports,
}

impl Collection {
    /// Every collection, in the order they are created.
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Documents,
        Collection::AuditLog,
        Collection::Exports,
    ];

    /// Persistent name of the collection (file stem or table name).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Documents => "documents",
            Self::AuditLog => "logs",
            Self::Exports => "exports",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered whole-collection persistence.
///
/// Implementations must make `save` atomic: after a failed save the
/// previous durable state is still what `load` returns. A missing or
/// corrupt collection loads as empty; genuine I/O or connection failures
/// are returned as errors.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug + 'static {
    /// Short backend name (`"json"` or `"postgres"`).
    fn backend(&self) -> &'static str;

    /// Load every record of a collection in insertion order.
    async fn load(&self, collection: Collection) -> AppResult<Vec<Record>>;

    /// Replace the whole collection.
    async fn save(&self, collection: Collection, records: &[Record]) -> AppResult<()>;

    /// Check that the backing storage is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self);
}
