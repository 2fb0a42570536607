//! Filedash Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! client-side validation shared by the Filedash client and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, LogLevel};
