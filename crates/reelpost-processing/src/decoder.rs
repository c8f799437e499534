//! Video probing and single-frame decoding.

use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::FrameError;

/// What the sampler needs to know about a video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub frame_count: i64,
    /// Frames per second, when the container reports a usable rate
    pub fps: Option<f64>,
}

#[async_trait]
pub trait VideoDecoder: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, FrameError>;

    /// Decode frame number `index` (0-based)
    async fn decode_frame(&self, path: &Path, index: u64) -> Result<DynamicImage, FrameError>;
}

/// Reject paths with shell metacharacters or traversal sequences
fn validate_path(path: &Path) -> Result<PathBuf, FrameError> {
    let path_str = path.to_string_lossy();
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path_str.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(FrameError::InvalidPath(format!(
            "path contains dangerous characters: {}",
            path_str
        )));
    }
    if path_str.contains("..") {
        return Err(FrameError::InvalidPath(format!(
            "path contains directory traversal: {}",
            path_str
        )));
    }
    Ok(path.to_path_buf())
}

fn validate_executable(path: &str) -> Result<(), FrameError> {
    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(FrameError::InvalidPath(format!(
            "executable path contains unsafe characters: {}",
            path
        )));
    }
    Ok(())
}

/// "30000/1001" style rate; a zero denominator means no usable rate.
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        None
    } else {
        Some(num / den)
    }
}

fn number_field(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse `ffprobe -of json` output into [`VideoInfo`].
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<VideoInfo, FrameError> {
    let probe: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| FrameError::CannotOpen(format!("unreadable ffprobe output: {}", e)))?;

    let stream = probe["streams"]
        .get(0)
        .ok_or_else(|| FrameError::CannotOpen("no video stream found".to_string()))?;

    let fps = stream["r_frame_rate"].as_str().and_then(parse_rate);

    let frame_count = match number_field(&stream["nb_frames"]) {
        Some(n) => n as i64,
        None => {
            let duration = number_field(&stream["duration"])
                .or_else(|| number_field(&probe["format"]["duration"]));
            match (duration, fps) {
                (Some(duration), Some(fps)) => (duration * fps).floor() as i64,
                _ => 0,
            }
        }
    };

    Ok(VideoInfo { frame_count, fps })
}

#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegDecoder {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Result<Self, FrameError> {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffmpeg_path)?;
        validate_executable(&ffprobe_path)?;
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }
}

#[async_trait]
impl VideoDecoder for FfmpegDecoder {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path
    ))]
    async fn probe(&self, path: &Path) -> Result<VideoInfo, FrameError> {
        let start = std::time::Instant::now();
        let path = validate_path(path)?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=nb_frames,r_frame_rate,duration",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
            ])
            .arg(&path)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(FrameError::CannotOpen(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let info = parse_probe_output(&output.stdout)?;
        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            frame_count = info.frame_count,
            fps = ?info.fps,
            "Video probe completed"
        );
        Ok(info)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path
    ))]
    async fn decode_frame(&self, path: &Path, index: u64) -> Result<DynamicImage, FrameError> {
        let path = validate_path(path)?;

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(&path)
            .args([
                "-vf".to_string(),
                format!("select=eq(n\\,{})", index),
                "-vframes".to_string(),
                "1".to_string(),
                "-f".to_string(),
                "image2pipe".to_string(),
                "-vcodec".to_string(),
                "png".to_string(),
                "-".to_string(),
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrameError::Decode {
                index,
                message: stderr
                    .lines()
                    .last()
                    .unwrap_or("ffmpeg produced no output")
                    .to_string(),
            });
        }

        image::load_from_memory_with_format(&output.stdout, image::ImageFormat::Png).map_err(|e| {
            FrameError::Decode {
                index,
                message: e.to_string(),
            }
        })
    }
}
