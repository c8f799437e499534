//! Thumbnail candidate sampling.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use reelpost_core::constants::{FRAMES_URL_PREFIX, FRAME_JPEG_QUALITY, FRAME_SAMPLE_COUNT};
use reelpost_core::models::FrameDescriptor;
use reelpost_storage::LocalDirectory;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::decoder::VideoDecoder;
use crate::error::FrameError;

/// Five frame indices spread evenly over the middle 80% of `frame_count` frames.
///
/// When the span is too short to step through, every index collapses to the start.
pub fn sample_positions(frame_count: i64) -> Vec<u64> {
    if frame_count <= 0 {
        return Vec::new();
    }
    let start = frame_count / 10;
    let end = frame_count * 9 / 10;
    let step = (end - start) / (FRAME_SAMPLE_COUNT as i64 - 1);
    (0..FRAME_SAMPLE_COUNT as i64)
        .map(|i| (start + i * step) as u64)
        .collect()
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn encode_jpeg(frame: &DynamicImage) -> Result<Vec<u8>, FrameError> {
    let rgb = DynamicImage::ImageRgb8(frame.to_rgb8());
    let mut buffer = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut buffer,
        FRAME_JPEG_QUALITY,
    ))
    .map_err(|e| FrameError::Encode(e.to_string()))?;
    Ok(buffer)
}

fn new_batch_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[derive(Clone)]
pub struct FrameSampler {
    decoder: Arc<dyn VideoDecoder>,
}

impl FrameSampler {
    pub fn new(decoder: Arc<dyn VideoDecoder>) -> Self {
        Self { decoder }
    }

    /// Sample frames from `video` into `frames_dir`, replacing the previous batch.
    ///
    /// Frames that fail to decode are skipped, so fewer than five may come back.
    #[tracing::instrument(skip(self, frames_dir), fields(video = %video.display()))]
    pub async fn extract(
        &self,
        video: &Path,
        frames_dir: &LocalDirectory,
    ) -> Result<Vec<FrameDescriptor>, FrameError> {
        let start = Instant::now();
        let info = self.decoder.probe(video).await?;
        if info.frame_count <= 0 {
            return Err(FrameError::NoFrames);
        }

        let positions = sample_positions(info.frame_count);
        let purged = frames_dir.purge_extension("jpg").await?;
        let batch_id = new_batch_id();

        tracing::debug!(
            frame_count = info.frame_count,
            fps = ?info.fps,
            positions = ?positions,
            purged,
            batch_id = %batch_id,
            "Sampling frames"
        );

        let mut frames = Vec::with_capacity(positions.len());
        for (index, position) in positions.into_iter().enumerate() {
            let frame = match self.decoder.decode_frame(video, position).await {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!(index, position, error = %e, "Skipping undecodable frame");
                    continue;
                }
            };

            let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(&frame))
                .await
                .map_err(|e| FrameError::Encode(format!("encoder task failed: {}", e)))??;

            let filename = format!("{}_frame_{}.jpg", batch_id, index);
            let path = frames_dir.resolve(&filename)?;
            tokio::fs::write(&path, &jpeg).await?;

            let timestamp = info
                .fps
                .map(|fps| round1(position as f64 / fps))
                .unwrap_or(0.0);

            frames.push(FrameDescriptor {
                url: format!("{}{}", FRAMES_URL_PREFIX, filename),
                path: path.to_string_lossy().to_string(),
                timestamp,
                index,
            });
        }

        tracing::info!(
            frames = frames.len(),
            batch_id = %batch_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Frame extraction completed"
        );

        Ok(frames)
    }
}
