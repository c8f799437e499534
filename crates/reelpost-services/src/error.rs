//! Conversions from service errors into the HTTP-facing [`AppError`].

use reelpost_core::AppError;

use crate::oauth::AuthError;
use crate::youtube::PlatformError;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => AppError::Internal(format!("Credential store error: {}", e)),
            other => AppError::Authorization(other.to_string()),
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::EmptyFile => AppError::InvalidInput(err.to_string()),
            PlatformError::Io(e) => AppError::Internal(format!("IO error: {}", e)),
            other => AppError::Platform(other.to_string()),
        }
    }
}
