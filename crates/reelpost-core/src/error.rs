//! Error types module
//!
//! All failures that reach the HTTP surface are unified under [`AppError`]. Domain
//! crates keep their own `thiserror` enums and convert into `AppError` at the edge;
//! [`ErrorMetadata`] describes how each variant is presented to clients.

use std::io;

/// Level at which the HTTP layer logs an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code clients can branch on, e.g. `PLATFORM_ERROR`.
    fn error_code(&self) -> &'static str;

    /// True when the same request may succeed later.
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Text placed in the `error` field of the response body.
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their details to clients.
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// How one error class is rendered and logged.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const INTERNAL: Presentation = Presentation {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::InvalidInput(_) => Presentation {
                status: 400,
                code: "INVALID_INPUT",
                recoverable: false,
                action: Some("Check the submitted form fields and try again"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::NotFound(_) => Presentation {
                status: 404,
                code: "NOT_FOUND",
                recoverable: false,
                action: None,
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::PayloadTooLarge(_) => Presentation {
                status: 413,
                code: "PAYLOAD_TOO_LARGE",
                recoverable: false,
                action: Some("Upload a smaller video"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::Internal(_) | AppError::InternalWithSource { .. } => INTERNAL,
            AppError::Unauthorized(_) => Presentation {
                status: 401,
                code: "UNAUTHORIZED",
                recoverable: false,
                action: Some("Sign in with Google and try again"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::Authorization(_) => Presentation {
                status: 500,
                code: "AUTHORIZATION_FAILED",
                recoverable: true,
                action: Some("Restart the sign-in flow"),
                sensitive: false,
                level: LogLevel::Warn,
            },
            AppError::Platform(_) => Presentation {
                status: 500,
                code: "PLATFORM_ERROR",
                recoverable: true,
                action: Some("Retry the upload"),
                sensitive: false,
                level: LogLevel::Error,
            },
            AppError::FrameExtraction(_) => Presentation {
                status: 400,
                code: "FRAME_EXTRACTION_FAILED",
                recoverable: false,
                action: Some("Check the video file and try a different one"),
                sensitive: false,
                level: LogLevel::Warn,
            },
        }
    }

    /// Variant name, attached to error logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Authorization(_) => "Authorization",
            AppError::Platform(_) => "Platform",
            AppError::FrameExtraction(_) => "FrameExtraction",
        }
    }

    /// Display text followed by up to five `Caused by:` lines from the source chain.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut chain = std::iter::successors(self.source(), |&err| err.source());
        for err in chain.by_ref().take(5) {
            details.push_str(&format!("\n  Caused by: {}", err));
        }
        if chain.next().is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Unauthorized(msg)
            | AppError::Authorization(msg)
            | AppError::Platform(msg)
            | AppError::FrameExtraction(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Frame not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Frame not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_unauthorized() {
        let err = AppError::Unauthorized("Not authenticated".to_string());
        assert_eq!(err.http_status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.client_message(), "Not authenticated");
    }

    #[test]
    fn test_error_metadata_platform_keeps_message() {
        let err = AppError::Platform("quotaExceeded".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "PLATFORM_ERROR");
        assert_eq!(err.client_message(), "quotaExceeded");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_authorization() {
        let err = AppError::Authorization("state mismatch".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "AUTHORIZATION_FAILED");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_frame_extraction() {
        let err = AppError::FrameExtraction("no frames".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "FRAME_EXTRACTION_FAILED");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_metadata_internal_is_sensitive() {
        let err = AppError::Internal("disk full at /var/tmp".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.error_type(), "Internal");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("inner").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
    }

    #[test]
    fn test_detailed_message_truncates_long_chains() {
        let mut err = anyhow::anyhow!("root cause");
        for depth in 0..8 {
            err = err.context(format!("layer {}", depth));
        }
        let details = AppError::from(err).detailed_message();
        assert_eq!(details.matches("Caused by").count(), 5);
        assert!(details.ends_with("... (truncated)"));
    }
}
