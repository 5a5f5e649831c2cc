//! Audit trail entities.

pub mod model;

pub use model::{AuditAction, AuditEntry, UNKNOWN_ACTOR};
