use reelpost_core::AppError;
use reelpost_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Could not open video: {0}")]
    CannotOpen(String),

    #[error("Video has no frames")]
    NoFrames,

    #[error("Failed to decode frame {index}: {message}")]
    Decode { index: u64, message: String },

    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Frame directory error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::CannotOpen(_) | FrameError::NoFrames => {
                AppError::FrameExtraction(err.to_string())
            }
            other => AppError::Internal(format!("Frame extraction failed: {}", other)),
        }
    }
}
