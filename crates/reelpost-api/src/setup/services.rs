//! Service initialization
//!
//! External systems (identity provider, video platform, decoder, credential store)
//! are passed in as [`ServiceDeps`] so the same wiring serves production and tests.

use crate::state::{AppState, MediaDirs, SessionState};
use anyhow::{Context, Result};
use reelpost_core::Config;
use reelpost_infra::{
    spawn_progress_cleanup, spawn_session_cleanup, ProgressTracker, SessionCookie, SessionStore,
};
use reelpost_processing::{FfmpegDecoder, FrameSampler, VideoDecoder};
use reelpost_services::{
    AuthFlow, CredentialStore, FileCredentialStore, GoogleIdentityProvider, IdentityProvider,
    VideoPlatform, VideoUploader, YouTubeClient,
};
use reelpost_storage::LocalDirectory;
use std::sync::Arc;
use std::time::Duration;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub struct ServiceDeps {
    pub identity: Arc<dyn IdentityProvider>,
    pub credentials: Arc<dyn CredentialStore>,
    pub platform: Arc<dyn VideoPlatform>,
    pub decoder: Arc<dyn VideoDecoder>,
}

/// Google OAuth, the YouTube Data API, ffmpeg and the token file.
pub fn production_deps(config: &Config) -> Result<ServiceDeps> {
    let identity = GoogleIdentityProvider::new(
        config.client_secrets().cloned(),
        config.redirect_uri(),
    );

    let platform = YouTubeClient::new(config.youtube_api_base())
        .context("Failed to build YouTube API client")?;

    let decoder = FfmpegDecoder::new(config.ffmpeg_path(), config.ffprobe_path())
        .context("Invalid ffmpeg/ffprobe configuration")?;

    tracing::info!(
        token_file = %config.token_file().display(),
        api_base = %config.youtube_api_base(),
        ffmpeg_path = %config.ffmpeg_path(),
        "External services configured"
    );

    Ok(ServiceDeps {
        identity: Arc::new(identity),
        credentials: Arc::new(FileCredentialStore::new(config.token_file())),
        platform: Arc::new(platform),
        decoder: Arc::new(decoder),
    })
}

/// Build the shared application state.
pub async fn initialize_services(config: &Config, deps: ServiceDeps) -> Result<Arc<AppState>> {
    let uploads = LocalDirectory::new(config.upload_dir())
        .await
        .with_context(|| format!("Cannot create upload dir {}", config.upload_dir().display()))?;
    let frames = LocalDirectory::new(config.frames_dir())
        .await
        .context("Cannot create frames dir")?;

    let cookie = SessionCookie::new(config.secret_key(), config.is_hosted(), config.session_ttl())
        .map_err(|e| anyhow::anyhow!("Invalid session signing key: {}", e))?;

    let state = AppState {
        config: Arc::new(config.clone()),
        auth: AuthFlow::new(deps.identity, deps.credentials),
        uploader: VideoUploader::new(deps.platform, config.upload_chunk_size()),
        sampler: FrameSampler::new(deps.decoder),
        progress: Arc::new(ProgressTracker::new(config.progress_ttl())),
        sessions: SessionState {
            store: Arc::new(SessionStore::new(config.session_ttl())),
            cookie,
        },
        dirs: MediaDirs { uploads, frames },
    };

    spawn_progress_cleanup(state.progress.clone(), CLEANUP_INTERVAL);
    spawn_session_cleanup(state.sessions.store.clone(), CLEANUP_INTERVAL);

    tracing::info!(
        upload_dir = %state.dirs.uploads.path().display(),
        chunk_size = config.upload_chunk_size(),
        "Services initialized"
    );

    Ok(Arc::new(state))
}
