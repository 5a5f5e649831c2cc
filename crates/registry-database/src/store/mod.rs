//! [`RecordStore`] implementations and backend selection.

pub mod json;
pub mod postgres;

use std::sync::Arc;

use registry_core::AppResult;
use registry_core::config::{AppConfig, StoreBackend};
use registry_core::traits::RecordStore;

pub use json::JsonFileStore;
pub use postgres::PgRecordStore;

/// Open the backend selected by `database.backend`.
///
/// The postgres backend connects and applies pending migrations before
/// returning.
pub async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn RecordStore>> {
    match config.database.backend {
        StoreBackend::Json => {
            let store = JsonFileStore::open(config.storage.records_path()).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PgRecordStore::connect(&config.database).await?;
            Ok(Arc::new(store))
        }
    }
}
