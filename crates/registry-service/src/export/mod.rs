//! Spreadsheet and Word exports of document snapshots.

pub mod columns;
pub mod service;
pub mod spreadsheet;
pub mod word;

pub use service::{ExportService, ExportedFile};
