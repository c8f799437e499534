use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One extracted thumbnail candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FrameDescriptor {
    /// URL under which the frame is served (`/frames/{file}`)
    pub url: String,
    /// Filesystem path of the JPEG
    pub path: String,
    /// Position in the video, seconds rounded to one decimal
    pub timestamp: f64,
    /// Ordinal within the batch (0-4)
    pub index: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractFramesResponse {
    pub success: bool,
    pub frames: Vec<FrameDescriptor>,
}
