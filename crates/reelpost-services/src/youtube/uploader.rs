use bytes::{Bytes, BytesMut};
use reelpost_core::models::{
    video_categories, watch_url, CredentialRecord, UploadMetadata, UploadResult, VideoCategory,
};
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::{thumbnail_mime_type, ChunkStatus, PlatformError, VideoPlatform};

/// Receives the cumulative upload percentage, 0 to 100.
pub type ProgressCallback = dyn Fn(u8) + Send + Sync;

/// Drives the resumable upload loop against a [`VideoPlatform`].
#[derive(Clone)]
pub struct VideoUploader {
    platform: Arc<dyn VideoPlatform>,
    chunk_size: usize,
}

impl VideoUploader {
    pub fn new(platform: Arc<dyn VideoPlatform>, chunk_size: usize) -> Self {
        Self {
            platform,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[tracing::instrument(skip(self, credential, metadata, progress), fields(path = %path.display()))]
    pub async fn upload_video(
        &self,
        credential: &CredentialRecord,
        path: &Path,
        metadata: &UploadMetadata,
        progress: Option<&ProgressCallback>,
    ) -> Result<UploadResult, PlatformError> {
        let start = Instant::now();
        let mut file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();
        if total == 0 {
            return Err(PlatformError::EmptyFile);
        }

        let resource = metadata.to_video_resource();
        let session_url = self
            .platform
            .begin_upload(&credential.token, &resource, total)
            .await?;

        tracing::info!(
            total_bytes = total,
            chunk_size = self.chunk_size,
            privacy_status = %resource.status.privacy_status,
            "Resumable upload session opened"
        );

        let mut offset: u64 = 0;
        let response = loop {
            let len = (total - offset).min(self.chunk_size as u64) as usize;
            let mut buffer = BytesMut::zeroed(len);
            file.seek(SeekFrom::Start(offset)).await?;
            file.read_exact(&mut buffer).await?;
            let chunk = buffer.freeze();

            match self
                .platform
                .upload_chunk(&credential.token, &session_url, offset, total, chunk)
                .await?
            {
                ChunkStatus::Complete(response) => break response,
                ChunkStatus::Incomplete { bytes_received } => {
                    if bytes_received <= offset || bytes_received >= total {
                        return Err(PlatformError::Protocol(format!(
                            "upload stalled at {} of {} bytes",
                            bytes_received, total
                        )));
                    }
                    offset = bytes_received;

                    let percent = percent_complete(offset, total);
                    tracing::debug!(offset, percent, "Chunk accepted");
                    if let Some(callback) = progress {
                        callback(percent);
                    }
                }
            }
        };

        let video_id = response
            .get("id")
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                PlatformError::Protocol("upload finished without a video id".to_string())
            })?;

        if let Some(callback) = progress {
            callback(100);
        }

        tracing::info!(
            video_id = %video_id,
            total_bytes = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Video upload completed"
        );

        Ok(UploadResult {
            video_url: watch_url(&video_id),
            video_id,
            response,
        })
    }

    #[tracing::instrument(skip(self, credential), fields(path = %image_path.display()))]
    pub async fn set_thumbnail(
        &self,
        credential: &CredentialRecord,
        video_id: &str,
        image_path: &Path,
    ) -> Result<serde_json::Value, PlatformError> {
        let image = tokio::fs::read(image_path).await?;
        let mime_type = thumbnail_mime_type(image_path);

        let response = self
            .platform
            .set_thumbnail(&credential.token, video_id, mime_type, Bytes::from(image))
            .await?;

        tracing::info!(video_id = %video_id, mime_type, "Thumbnail set");
        Ok(response)
    }

    pub fn get_categories(&self) -> Vec<VideoCategory> {
        video_categories()
    }
}

fn percent_complete(received: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((received as u128 * 100) / total as u128).min(100) as u8
}
