//! Reelpost Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every reelpost component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, ClientSecrets, Config, Deployment, SecretKey, UploaderConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
