//! # registry-storage
//!
//! Filesystem storage for the archive registry: flat local directories,
//! the upload store with its extension allow-list and collision-safe
//! naming, and filename sanitizing shared with the export service.

pub mod providers;
pub mod sanitize;
pub mod uploads;

pub use providers::local::LocalDirectory;
pub use sanitize::sanitize_filename;
pub use uploads::UploadStore;
