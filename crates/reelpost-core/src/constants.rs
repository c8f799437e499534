//! Protocol and application constants.

/// OAuth scopes requested from Google.
pub const OAUTH_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/youtube.upload",
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/youtube.force-ssl",
];

/// Google OAuth endpoints, used when client secrets omit them.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Base of the canonical watch URL; the video id is appended.
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Default size of a single resumable upload chunk (10 MiB).
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Resumable upload chunks must be a multiple of this size (except the last one).
pub const UPLOAD_CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Access tokens expiring within this window are treated as already expired.
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Number of thumbnail candidates sampled per extraction batch.
pub const FRAME_SAMPLE_COUNT: usize = 5;

/// JPEG quality of extracted frames.
pub const FRAME_JPEG_QUALITY: u8 = 90;

/// Subdirectory of the upload directory that holds extracted frames.
pub const FRAMES_SUBDIR: &str = "frames";

/// URL prefix under which extracted frames are served.
pub const FRAMES_URL_PREFIX: &str = "/frames/";

/// Name of the signed session cookie.
pub const SESSION_COOKIE_NAME: &str = "reelpost_session";

/// Returned by progress polling when the upload id is unknown.
pub const UNKNOWN_PROGRESS: i32 = -1;
