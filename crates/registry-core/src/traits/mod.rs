//! Core traits defined in `registry-core` and implemented by other crates.

pub mod record_store;

pub use record_store::{Collection, Record, RecordStore};
