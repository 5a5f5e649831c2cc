//! Archived document metadata.

pub mod model;

pub use model::{DISPLAY_FIELD, Document};
