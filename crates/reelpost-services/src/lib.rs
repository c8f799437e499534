//! Reelpost Services Layer
//!
//! Business services: the OAuth authorization flow that maintains the stored
//! credential, and the upload orchestrator that drives the platform's resumable
//! upload protocol. External systems sit behind [`IdentityProvider`] and
//! [`VideoPlatform`]; HTTP handlers stay in reelpost-api.

pub mod error;
pub mod oauth;
pub mod youtube;

pub use oauth::{
    AuthError, AuthFlow, AuthorizationRequest, GoogleIdentityProvider, IdentityProvider,
};
pub use reelpost_storage::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use youtube::{
    thumbnail_mime_type, ChunkStatus, PlatformError, ProgressCallback, VideoPlatform,
    VideoUploader, YouTubeClient,
};
