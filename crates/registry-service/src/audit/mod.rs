//! Audit trail service.

pub mod service;

pub use service::AuditService;
