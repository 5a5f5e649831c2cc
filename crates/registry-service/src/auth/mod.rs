//! Login and token authentication.

pub mod service;

pub use service::{AuthService, LoginResult};
