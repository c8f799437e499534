//! Reelpost Storage Library
//!
//! Local persistence for the uploader: the single stored OAuth credential and the
//! working directory that holds temporary uploads and extracted frames.
//!
//! Names handed to [`LocalDirectory`] are plain file names. They must not contain
//! path separators or `..`.

pub mod credentials;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use credentials::{FileCredentialStore, InMemoryCredentialStore};
pub use local::LocalDirectory;
pub use traits::{CredentialStore, StorageError, StorageResult};
