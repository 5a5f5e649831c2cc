//! Media upload service.

pub mod service;

pub use service::UploadService;
