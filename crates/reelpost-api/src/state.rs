//! Application state shared by all handlers.

use reelpost_core::Config;
use reelpost_infra::{ProgressTracker, SessionCookie, SessionStore};
use reelpost_processing::FrameSampler;
use reelpost_services::{AuthFlow, VideoUploader};
use reelpost_storage::LocalDirectory;
use std::sync::Arc;

/// Working directories: scoped temp uploads and the extracted frame batch.
#[derive(Clone, Debug)]
pub struct MediaDirs {
    pub uploads: LocalDirectory,
    pub frames: LocalDirectory,
}

/// OAuth session plumbing for the browser-facing handshake.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub store: Arc<SessionStore>,
    pub cookie: SessionCookie,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthFlow,
    pub uploader: VideoUploader,
    pub sampler: FrameSampler,
    pub progress: Arc<ProgressTracker>,
    pub sessions: SessionState,
    pub dirs: MediaDirs,
}
