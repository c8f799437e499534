//! Storage abstraction trait
//!
//! This module defines the credential store contract and the errors shared by the
//! local storage helpers.

use async_trait::async_trait;
use reelpost_core::models::CredentialRecord;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidKey(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for the single credential record.
///
/// There is at most one record; `save` replaces it and `delete` removes it.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored record. Absent or unreadable records yield `None`.
    async fn load(&self) -> StorageResult<Option<CredentialRecord>>;

    /// Persist the record, replacing any previous one
    async fn save(&self, record: &CredentialRecord) -> StorageResult<()>;

    /// Remove the record. Succeeds when nothing is stored.
    async fn delete(&self) -> StorageResult<()>;
}
