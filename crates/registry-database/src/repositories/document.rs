//! Document repository implementation.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::traits::{Collection, Record, RecordStore};
use registry_core::types::DocumentId;
use registry_entity::document::Document;
use registry_entity::timestamp;

use super::codec;

const COLLECTION: Collection = Collection::Documents;

fn id_of(record: &Record) -> Option<&str> {
    codec::string_field(record, &["id"])
}

/// Repository for archived document metadata.
#[derive(Debug)]
pub struct DocumentRepository {
    store: Arc<dyn RecordStore>,
    lock: Mutex<()>,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// All documents in insertion order.
    pub async fn find_all(&self) -> AppResult<Vec<Document>> {
        let records = self.store.load(COLLECTION).await?;
        Ok(codec::decode_all(COLLECTION, records))
    }

    /// Find a document by id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Document>> {
        let records = self.store.load(COLLECTION).await?;
        records
            .into_iter()
            .find(|r| id_of(r) == Some(id))
            .map(codec::decode::<Document>)
            .transpose()
            .map_err(AppError::from)
    }

    /// Append a document.
    ///
    /// Assigns a fresh id when the document has none and stamps
    /// `created_at`. A supplied id that is already taken is a Conflict.
    pub async fn add(&self, mut document: Document) -> AppResult<Document> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        if document.id.trim().is_empty() {
            document.id = DocumentId::new().to_string();
        } else if records.iter().any(|r| id_of(r) == Some(document.id.as_str())) {
            return Err(AppError::conflict(format!(
                "Document '{}' already exists",
                document.id
            )));
        }
        document.created_at = Some(Utc::now());
        document.updated_at = None;

        records.push(codec::encode(&document)?);
        self.store.save(COLLECTION, &records).await?;
        debug!(id = %document.id, "Document record added");
        Ok(document)
    }

    /// Replace the document stored under `id`.
    ///
    /// The stored id and `created_at` are kept; `updated_at` is stamped.
    pub async fn update(&self, id: &str, mut replacement: Document) -> AppResult<Document> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        let index = records
            .iter()
            .position(|r| id_of(r) == Some(id))
            .ok_or_else(|| AppError::not_found(format!("Document '{id}' not found")))?;

        replacement.id = id.to_string();
        replacement.created_at = codec::string_field(&records[index], &["created_at"])
            .and_then(timestamp::parse);
        replacement.updated_at = Some(Utc::now());

        records[index] = codec::encode(&replacement)?;
        self.store.save(COLLECTION, &records).await?;
        debug!(id = %id, "Document record updated");
        Ok(replacement)
    }

    /// Remove a document. The collection is untouched when `id` is absent.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        let index = records
            .iter()
            .position(|r| id_of(r) == Some(id))
            .ok_or_else(|| AppError::not_found(format!("Document '{id}' not found")))?;

        records.remove(index);
        self.store.save(COLLECTION, &records).await?;
        debug!(id = %id, "Document record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use registry_core::error::ErrorKind;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        Document::from_record(value.as_object().cloned().unwrap()).unwrap()
    }

    async fn repo(dir: &tempfile::TempDir) -> DocumentRepository {
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        DocumentRepository::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_add_assigns_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;

        let a = repo.add(document(json!({"Arquivo": "A"}))).await.unwrap();
        let b = repo.add(document(json!({"Arquivo": "B"}))).await.unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.created_at.is_some());
        assert_eq!(a.associated_file_name, "");

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].display_name(), Some("A"));
    }

    #[tokio::test]
    async fn test_add_with_taken_id_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;
        repo.add(document(json!({"id": "doc-1"}))).await.unwrap();

        let err = repo.add(document(json!({"id": "doc-1"}))).await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;
        let added = repo.add(document(json!({"Arquivo": "A"}))).await.unwrap();

        let updated = repo
            .update(&added.id, document(json!({"id": "other", "Arquivo": "A2"})))
            .await
            .unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.created_at, added.created_at);
        assert!(updated.updated_at.is_some());
        let stored = repo.find_by_id(&added.id).await.unwrap().unwrap();
        assert_eq!(stored.display_name(), Some("A2"));
        assert!(repo.find_by_id("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_collection() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir).await;
        repo.add(document(json!({"Arquivo": "A"}))).await.unwrap();

        let err = repo.delete("nope").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);

        let err = repo.update("nope", document(json!({}))).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
