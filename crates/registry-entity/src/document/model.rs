//! Document entity model.

use chrono::{DateTime, Utc};
use registry_core::traits::Record;
use registry_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Metadata key conventionally holding a document's display name.
pub const DISPLAY_FIELD: &str = "Arquivo";

/// A metadata record describing one archived item.
///
/// Besides the fixed bookkeeping fields, a document carries arbitrary
/// user-defined key/value pairs in [`Document::fields`]. Serialization
/// keeps the id first and the user fields in their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Immutable identifier. Empty until the registry assigns one.
    #[serde(default)]
    pub id: String,
    /// User-defined metadata.
    #[serde(flatten)]
    pub fields: Record,
    /// Name of the associated upload, or empty.
    #[serde(default, alias = "arquivo_nome")]
    pub associated_file_name: String,
    /// When the document was added.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::timestamp::deserialize_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// When the document was last replaced.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::timestamp::deserialize_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Interpret a raw JSON object as a document.
    pub fn from_record(record: Record) -> AppResult<Self> {
        serde_json::from_value(serde_json::Value::Object(record))
            .map_err(|e| AppError::validation(format!("Invalid document: {e}")))
    }

    /// Flatten the document back into a raw record.
    pub fn to_record(&self) -> AppResult<Record> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(AppError::internal("Document did not serialize to an object")),
        }
    }

    /// The display name (`Arquivo`) if present and textual.
    pub fn display_name(&self) -> Option<&str> {
        self.fields.get(DISPLAY_FIELD).and_then(|v| v.as_str())
    }

    /// Whether an upload is associated with this document.
    pub fn has_media(&self) -> bool {
        !self.associated_file_name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unknown_keys_land_in_fields() {
        let doc = Document::from_record(record(json!({
            "Arquivo": "Ata 1932",
            "Caixa": 4,
            "associated_file_name": "ata.pdf"
        })))
        .unwrap();
        assert_eq!(doc.display_name(), Some("Ata 1932"));
        assert_eq!(doc.fields["Caixa"], json!(4));
        assert!(doc.has_media());
        assert!(doc.id.is_empty());
    }

    #[test]
    fn test_legacy_file_key_is_accepted() {
        let doc = Document::from_record(record(json!({
            "id": "20230101120000000000",
            "arquivo_nome": "foto.jpg"
        })))
        .unwrap();
        assert_eq!(doc.associated_file_name, "foto.jpg");
        let out = doc.to_record().unwrap();
        assert_eq!(out["associated_file_name"], "foto.jpg");
        assert!(!out.contains_key("arquivo_nome"));
    }

    #[test]
    fn test_id_serializes_first() {
        let doc = Document::from_record(record(json!({"b": 1, "a": 2, "id": "x"}))).unwrap();
        let keys: Vec<String> = doc.to_record().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "b", "a", "associated_file_name"]);
    }

    #[test]
    fn test_rejects_non_string_id() {
        assert!(Document::from_record(record(json!({"id": 7}))).is_err());
    }
}
