//! In-process stand-ins for the identity provider, the platform and the decoder.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, RgbImage};
use reelpost_core::models::{CredentialRecord, VideoResource};
use reelpost_processing::{FrameError, VideoDecoder, VideoInfo};
use reelpost_services::{
    AuthError, AuthorizationRequest, ChunkStatus, IdentityProvider, PlatformError, VideoPlatform,
};
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;

pub const FAKE_STATE: &str = "fake-oauth-state";
pub const FAKE_AUTH_URL: &str = "https://accounts.example.com/o/oauth2/auth";
pub const GOOD_CODE: &str = "good-code";
pub const FAKE_VIDEO_ID: &str = "dQw4w9WgXcQ";

#[derive(Default)]
pub struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError> {
        Ok(AuthorizationRequest {
            url: format!("{}?state={}", FAKE_AUTH_URL, FAKE_STATE),
            state: FAKE_STATE.to_string(),
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<CredentialRecord, AuthError> {
        if code != GOOD_CODE {
            return Err(AuthError::Exchange("invalid_grant".to_string()));
        }
        Ok(CredentialRecord {
            token: "fresh-access-token".to_string(),
            refresh_token: Some("fresh-refresh-token".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            scopes: None,
            expiry: None,
        })
    }

    async fn refresh(&self, _record: &CredentialRecord) -> Result<CredentialRecord, AuthError> {
        Err(AuthError::Refresh("refresh disabled in tests".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailCall {
    pub video_id: String,
    pub mime_type: String,
    pub len: usize,
}

/// Accepts every chunk and completes the upload once all bytes arrived.
#[derive(Default)]
pub struct FakePlatform {
    pub fail_upload: bool,
    pub fail_thumbnail: bool,
    pub resources: Mutex<Vec<VideoResource>>,
    pub chunk_offsets: Mutex<Vec<u64>>,
    pub thumbnails: Mutex<Vec<ThumbnailCall>>,
}

impl FakePlatform {
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_thumbnail() -> Self {
        Self {
            fail_thumbnail: true,
            ..Self::default()
        }
    }

    pub fn thumbnail_calls(&self) -> Vec<ThumbnailCall> {
        self.thumbnails.lock().unwrap().clone()
    }

    pub fn uploaded_resources(&self) -> Vec<VideoResource> {
        self.resources.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn begin_upload(
        &self,
        _access_token: &str,
        resource: &VideoResource,
        _total_bytes: u64,
    ) -> Result<String, PlatformError> {
        if self.fail_upload {
            return Err(PlatformError::Api {
                status: 403,
                message: "The user has exceeded the number of videos they may upload."
                    .to_string(),
            });
        }
        self.resources.lock().unwrap().push(resource.clone());
        Ok("https://upload.example.com/session/1".to_string())
    }

    async fn upload_chunk(
        &self,
        _access_token: &str,
        _session_url: &str,
        offset: u64,
        total_bytes: u64,
        chunk: Bytes,
    ) -> Result<ChunkStatus, PlatformError> {
        self.chunk_offsets.lock().unwrap().push(offset);
        let received = offset + chunk.len() as u64;
        if received < total_bytes {
            Ok(ChunkStatus::Incomplete {
                bytes_received: received,
            })
        } else {
            Ok(ChunkStatus::Complete(
                json!({"kind": "youtube#video", "id": FAKE_VIDEO_ID}),
            ))
        }
    }

    async fn set_thumbnail(
        &self,
        _access_token: &str,
        video_id: &str,
        mime_type: &str,
        image: Bytes,
    ) -> Result<serde_json::Value, PlatformError> {
        if self.fail_thumbnail {
            return Err(PlatformError::Api {
                status: 403,
                message: "The authenticated user doesn't have permissions to upload and set custom video thumbnails.".to_string(),
            });
        }
        self.thumbnails.lock().unwrap().push(ThumbnailCall {
            video_id: video_id.to_string(),
            mime_type: mime_type.to_string(),
            len: image.len(),
        });
        Ok(json!({"items": []}))
    }
}

/// Reports a fixed frame count and decodes every index to a flat image.
pub struct FakeDecoder {
    info: VideoInfo,
}

impl FakeDecoder {
    pub fn with_frames(frame_count: i64, fps: Option<f64>) -> Self {
        Self {
            info: VideoInfo { frame_count, fps },
        }
    }
}

#[async_trait]
impl VideoDecoder for FakeDecoder {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, FrameError> {
        let data = tokio::fs::read(path).await?;
        if data.starts_with(b"garbage") {
            return Err(FrameError::CannotOpen(path.display().to_string()));
        }
        Ok(self.info)
    }

    async fn decode_frame(&self, _path: &Path, index: u64) -> Result<DynamicImage, FrameError> {
        let shade = (index % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            32,
            18,
            image::Rgb([shade, 64, 128]),
        )))
    }
}
