//! Document registry service.

pub mod service;

pub use service::DocumentService;
