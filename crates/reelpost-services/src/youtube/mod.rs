//! Video platform integration: the resumable upload protocol and thumbnails.

mod client;
mod uploader;

use async_trait::async_trait;
use bytes::Bytes;
use reelpost_core::models::VideoResource;
use std::path::Path;
use thiserror::Error;

pub use client::YouTubeClient;
pub use uploader::{ProgressCallback, VideoUploader};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Request to the video platform failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Video platform returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from the video platform: {0}")]
    Protocol(String),

    #[error("Video file is empty")]
    EmptyFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server-side state of a resumable session after a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkStatus {
    /// More bytes are expected; `bytes_received` is the next offset to send.
    Incomplete { bytes_received: u64 },
    /// Upload finished; carries the created video resource.
    Complete(serde_json::Value),
}

/// The platform's upload API, authenticated with a bearer access token.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Open a resumable session and return its URL
    async fn begin_upload(
        &self,
        access_token: &str,
        resource: &VideoResource,
        total_bytes: u64,
    ) -> Result<String, PlatformError>;

    /// Send `chunk`, which starts at `offset` of a file of `total_bytes`
    async fn upload_chunk(
        &self,
        access_token: &str,
        session_url: &str,
        offset: u64,
        total_bytes: u64,
        chunk: Bytes,
    ) -> Result<ChunkStatus, PlatformError>;

    /// Replace the thumbnail of `video_id`
    async fn set_thumbnail(
        &self,
        access_token: &str,
        video_id: &str,
        mime_type: &str,
        image: Bytes,
    ) -> Result<serde_json::Value, PlatformError>;
}

/// `image/jpeg` for .jpg/.jpeg files, `image/png` for everything else.
pub fn thumbnail_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}
