//! Conversions between raw records and typed entities.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::traits::{Collection, Record};

/// Decode every record, skipping (and logging) the ones that do not fit `T`.
pub fn decode_all<T: DeserializeOwned>(collection: Collection, records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match decode(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(collection = %collection, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

/// Decode a single record.
pub fn decode<T: DeserializeOwned>(record: Record) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(record))
}

/// Encode an entity into a raw record.
pub fn encode<T: Serialize>(item: &T) -> AppResult<Record> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::internal(format!(
            "Entity serialized to a non-object value: {other}"
        ))),
    }
}

/// First string value found under any of `keys`.
pub fn string_field<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}
