//! Reelpost Infrastructure Library
//!
//! Shared infrastructure for the HTTP service:
//! - Middleware (request ID, security headers, signed session cookies)
//! - Telemetry initialization
//! - In-memory keyed stores with expiry (upload progress, OAuth sessions)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod progress;
pub mod session;

#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    SecurityHeadersConfig, SessionCookie,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use progress::{spawn_progress_cleanup, ProgressTracker};
pub use session::{spawn_session_cleanup, SessionStore};
