//! Export history repository implementation.

use std::sync::Arc;

use tokio::sync::Mutex;

use registry_core::result::AppResult;
use registry_core::traits::{Collection, RecordStore};
use registry_entity::export::ExportRecord;

use super::codec;

const COLLECTION: Collection = Collection::Exports;

/// Append-only export history.
#[derive(Debug)]
pub struct ExportRepository {
    store: Arc<dyn RecordStore>,
    lock: Mutex<()>,
}

impl ExportRepository {
    /// Create a new export repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Append one history entry.
    pub async fn append(&self, record: &ExportRecord) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;
        records.push(codec::encode(record)?);
        self.store.save(COLLECTION, &records).await
    }

    /// Every export, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<ExportRecord>> {
        let records = self.store.load(COLLECTION).await?;
        Ok(codec::decode_all(COLLECTION, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use registry_entity::export::ExportKind;

    #[tokio::test]
    async fn test_append_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        let repo = ExportRepository::new(store);

        repo.append(&ExportRecord::new("a.xlsx", ExportKind::Excel, "ana", 2, None))
            .await
            .unwrap();
        repo.append(&ExportRecord::new("b.docx", ExportKind::Word, "ana", 0, Some(vec![])))
            .await
            .unwrap();

        let history = repo.find_all().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].kind, ExportKind::Word);
        assert_eq!(history[0].document_count, 2);
    }
}
