//! Reelpost Processing
//!
//! Thumbnail candidate extraction: probes a video, samples five frames from the
//! middle of its timeline and writes them as JPEG files. Decoding goes through
//! the [`VideoDecoder`] trait; [`FfmpegDecoder`] shells out to ffprobe/ffmpeg.

pub mod decoder;
pub mod error;
pub mod sampler;

pub use decoder::{FfmpegDecoder, VideoDecoder, VideoInfo};
pub use error::FrameError;
pub use sampler::{round1, sample_positions, FrameSampler};
