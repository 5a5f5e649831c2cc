//! # registry-auth
//!
//! Authentication and authorization for the archive registry.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and policy enforcement
//! - `jwt`: access token creation and validation
//! - `rbac`: the two-tier modify/read-only role check

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::RbacEnforcer;
