//! Export history entities.

pub mod model;

pub use model::{ExportKind, ExportRecord};
