//! Configuration module
//!
//! The configuration is resolved once at startup from the process environment
//! (after loading `.env`) and shared with every collaborator through [`Config`].
//! Two deployment modes exist: `Local` for a developer machine and `Hosted` when the
//! `RENDER` variable is present.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::RngCore;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_UPLOAD_CHUNK_SIZE, FRAMES_SUBDIR, GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI,
    UPLOAD_CHUNK_ALIGNMENT,
};

const DEFAULT_PORT: u16 = 5000;
const MIN_SECRET_KEY_LEN: usize = 32;
const CLIENT_SECRETS_PREFIX: &str = "client_secret";

/// Where the service is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Hosted,
}

/// Session signing key. Never printed.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Fresh random key, used when no key is configured locally.
    pub fn random() -> Self {
        let mut bytes = vec![0u8; MIN_SECRET_KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes>)", self.0.len())
    }
}

/// OAuth client identity, as downloaded from the Google Cloud console.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse the console JSON format, which nests the fields under `web` or `installed`.
    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid client secrets JSON: {}", e))?;
        file.web.or(file.installed).ok_or_else(|| {
            anyhow::anyhow!("Client secrets JSON must contain a 'web' or 'installed' section")
        })
    }

    /// Load the first `client_secret*.json` file found in `dir` (sorted by name).
    pub fn discover(dir: &Path) -> Result<Option<Self>, anyhow::Error> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow::anyhow!("Cannot read {}: {}", dir.display(), e)),
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(CLIENT_SECRETS_PREFIX) && name.ends_with(".json"))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        match candidates.first() {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
                Self::from_json(&json).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub deployment: Deployment,
    pub secret_key: SecretKey,
}

/// Uploader configuration
#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub base: BaseConfig,
    pub redirect_uri: String,
    pub client_secrets: Option<ClientSecrets>,
    pub token_file: PathBuf,
    pub upload_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_video_size_bytes: usize,
    pub upload_chunk_size: usize,
    pub progress_ttl_secs: u64,
    pub session_ttl_secs: u64,
    pub youtube_api_base: String,
    /// One JSON object per log line (`LOG_FORMAT=json`)
    pub log_json: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploaderConfig>);

impl Config {
    fn as_uploader(&self) -> &UploaderConfig {
        &self.0
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        UploaderConfig::from_lookup(lookup).map(|config| Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_uploader().validate()
    }

    pub fn is_hosted(&self) -> bool {
        self.as_uploader().base.deployment == Deployment::Hosted
    }

    pub fn deployment(&self) -> Deployment {
        self.as_uploader().base.deployment
    }

    pub fn server_port(&self) -> u16 {
        self.as_uploader().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_uploader().base.cors_origins
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.as_uploader().base.secret_key
    }

    pub fn redirect_uri(&self) -> &str {
        &self.as_uploader().redirect_uri
    }

    pub fn client_secrets(&self) -> Option<&ClientSecrets> {
        self.as_uploader().client_secrets.as_ref()
    }

    pub fn token_file(&self) -> &Path {
        &self.as_uploader().token_file
    }

    pub fn upload_dir(&self) -> &Path {
        &self.as_uploader().upload_dir
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.as_uploader().upload_dir.join(FRAMES_SUBDIR)
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_uploader().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_uploader().ffprobe_path
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_uploader().max_video_size_bytes
    }

    pub fn upload_chunk_size(&self) -> usize {
        self.as_uploader().upload_chunk_size
    }

    pub fn progress_ttl(&self) -> Duration {
        Duration::from_secs(self.as_uploader().progress_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.as_uploader().session_ttl_secs)
    }

    pub fn youtube_api_base(&self) -> &str {
        &self.as_uploader().youtube_api_base
    }

    pub fn log_json(&self) -> bool {
        self.as_uploader().log_json
    }
}

impl UploaderConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        const MAX_VIDEO_SIZE_MB: usize = 2048;
        const PROGRESS_TTL_SECS: u64 = 3600;
        const SESSION_TTL_SECS: u64 = 3600;
        const YOUTUBE_API_BASE: &str = "https://www.googleapis.com";

        let deployment = if lookup("RENDER").is_some() {
            Deployment::Hosted
        } else {
            Deployment::Local
        };

        let server_port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let secret_key = match (deployment, lookup("SECRET_KEY")) {
            (_, Some(key)) if !key.is_empty() => SecretKey::new(key.into_bytes()),
            (Deployment::Hosted, _) => {
                return Err(anyhow::anyhow!(
                    "SECRET_KEY must be set when running in hosted mode"
                ))
            }
            (Deployment::Local, _) => SecretKey::random(),
        };

        let redirect_uri = match (deployment, lookup("REDIRECT_URI")) {
            (_, Some(uri)) if !uri.is_empty() => uri,
            (Deployment::Hosted, _) => {
                return Err(anyhow::anyhow!(
                    "REDIRECT_URI must be set when running in hosted mode"
                ))
            }
            (Deployment::Local, _) => format!("http://localhost:{}/auth/callback", server_port),
        };

        let client_secrets = match lookup("GOOGLE_CLIENT_SECRET") {
            Some(json) if !json.trim().is_empty() => Some(ClientSecrets::from_json(&json)?),
            _ if deployment == Deployment::Hosted => {
                return Err(anyhow::anyhow!(
                    "GOOGLE_CLIENT_SECRET must be set when running in hosted mode"
                ))
            }
            _ => {
                let dir = lookup("CLIENT_SECRETS_DIR").unwrap_or_else(|| ".".to_string());
                ClientSecrets::discover(Path::new(&dir))?
            }
        };

        let max_video_size_mb = lookup("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        Ok(UploaderConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                deployment,
                secret_key,
            },
            redirect_uri,
            client_secrets,
            token_file: PathBuf::from(
                lookup("TOKEN_FILE").unwrap_or_else(|| "token.json".to_string()),
            ),
            upload_dir: PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            max_video_size_bytes: max_video_size_mb.saturating_mul(1024 * 1024),
            upload_chunk_size: lookup("UPLOAD_CHUNK_SIZE_BYTES")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_UPLOAD_CHUNK_SIZE),
            progress_ttl_secs: lookup("PROGRESS_TTL_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(PROGRESS_TTL_SECS),
            session_ttl_secs: lookup("SESSION_TTL_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(SESSION_TTL_SECS),
            youtube_api_base: lookup("YOUTUBE_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| YOUTUBE_API_BASE.to_string()),
            log_json: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("PORT must be non-zero"));
        }

        if self.base.secret_key.len() < MIN_SECRET_KEY_LEN {
            return Err(anyhow::anyhow!(
                "SECRET_KEY must be at least {} characters long",
                MIN_SECRET_KEY_LEN
            ));
        }

        if self.upload_chunk_size == 0 || self.upload_chunk_size % UPLOAD_CHUNK_ALIGNMENT != 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_CHUNK_SIZE_BYTES must be a positive multiple of {} bytes",
                UPLOAD_CHUNK_ALIGNMENT
            ));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.progress_ttl_secs == 0 || self.session_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROGRESS_TTL_SECS and SESSION_TTL_SECS must be greater than zero"
            ));
        }

        Ok(())
    }
}
