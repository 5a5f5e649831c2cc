//! # registry-core
//!
//! Core crate for the archive registry. Contains the configuration schema,
//! the record-store abstraction shared by both persistence backends,
//! identifier generation, and the unified error system.
//!
//! This crate has **no** internal dependencies on other registry crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
