//! Audit log repository implementation.

use std::sync::Arc;

use tokio::sync::Mutex;

use registry_core::result::AppResult;
use registry_core::traits::{Collection, RecordStore};
use registry_entity::audit::AuditEntry;

use super::codec;

const COLLECTION: Collection = Collection::AuditLog;

/// Bounded, append-only audit log.
#[derive(Debug)]
pub struct AuditLogRepository {
    store: Arc<dyn RecordStore>,
    lock: Mutex<()>,
    max_entries: usize,
}

impl AuditLogRepository {
    /// Create a repository that retains at most `max_entries` entries.
    pub fn new(store: Arc<dyn RecordStore>, max_entries: usize) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            max_entries: max_entries.max(1),
        }
    }

    /// Append an entry, dropping the oldest ones beyond the cap.
    pub async fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;
        records.push(codec::encode(entry)?);

        if records.len() > self.max_entries {
            let excess = records.len() - self.max_entries;
            records.drain(..excess);
        }

        self.store.save(COLLECTION, &records).await
    }

    /// Retained entries, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<AuditEntry>> {
        let records = self.store.load(COLLECTION).await?;
        Ok(codec::decode_all(COLLECTION, records))
    }
}
