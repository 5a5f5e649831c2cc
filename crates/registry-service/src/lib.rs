//! # registry-service
//!
//! Business logic service layer for the archive registry. Each service
//! orchestrates repositories, the upload store, and the auth primitives
//! to implement one application-level use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod auth;
pub mod context;
pub mod document;
pub mod export;
pub mod upload;
pub mod user;

pub use audit::AuditService;
pub use auth::AuthService;
pub use context::RequestContext;
pub use document::DocumentService;
pub use export::ExportService;
pub use upload::UploadService;
pub use user::UserService;
