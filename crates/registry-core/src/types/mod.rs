//! Core type definitions used across the registry workspace.

pub mod id;

pub use id::*;
