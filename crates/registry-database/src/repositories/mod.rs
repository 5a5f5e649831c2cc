//! Repositories over the record collections.
//!
//! Every repository holds the shared store handle plus its own async
//! mutex; each load-modify-save cycle runs under that lock. Mutations work
//! on the raw records so entries this version cannot decode are carried
//! through a save untouched.

pub mod audit;
pub mod codec;
pub mod document;
pub mod export;
pub mod user;

pub use audit::AuditLogRepository;
pub use document::DocumentRepository;
pub use export::ExportRepository;
pub use user::UserRepository;
