//! Route handlers organized by domain.

pub mod audit;
pub mod auth;
pub mod document;
pub mod export;
pub mod health;
pub mod upload;
pub mod user;
