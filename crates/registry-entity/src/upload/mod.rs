//! Uploaded media descriptors.

pub mod model;

pub use model::UploadInfo;
