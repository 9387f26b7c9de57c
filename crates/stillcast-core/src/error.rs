//! Error types module
//!
//! All failures of the composition pipeline are unified under [`AppError`].
//! Each variant is one error kind; the HTTP layer collapses every downstream
//! kind to a 500 but keeps the kind visible through [`ErrorMetadata::error_code`].

use std::io;

use crate::constants::MISSING_PARAMETERS_MESSAGE;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "ENCODING_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Failed to fetch input from storage: {0}")]
    StorageFetch(String),

    #[error("FFmpeg not found: {0}")]
    EncoderUnavailable(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Failed to upload output to storage: {0}")]
    StorageUpload(String),

    #[error("All encoder slots are busy (waited {waited_secs}s)")]
    EncoderBusy { waited_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
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

/// Every rule on a composition request is "present and non-empty", so any
/// failure reports the same message.
impl From<validator::ValidationErrors> for AppError {
    fn from(_err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(MISSING_PARAMETERS_MESSAGE.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Send a smaller request body"),
            false,
            LogLevel::Debug,
        ),
        AppError::StorageFetch(_) => (
            500,
            "STORAGE_FETCH_ERROR",
            false,
            Some("Verify the image and audio blobs exist in the bucket"),
            false,
            LogLevel::Error,
        ),
        AppError::EncoderUnavailable(_) => (
            500,
            "ENCODER_UNAVAILABLE",
            false,
            Some("Contact support if this error persists"),
            false,
            LogLevel::Error,
        ),
        AppError::EncodingFailed(_) => (
            500,
            "ENCODING_FAILED",
            false,
            Some("Check that the image and audio files are valid media"),
            false,
            LogLevel::Error,
        ),
        AppError::StorageUpload(_) => (
            500,
            "STORAGE_UPLOAD_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
        AppError::EncoderBusy { .. } => (
            503,
            "ENCODER_BUSY",
            true,
            Some("Wait 30-60 seconds and retry"),
            false,
            LogLevel::Warn,
        ),
        // Not sensitive: outside production the underlying message is
        // returned in `details`; production hides details for every kind.
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::StorageFetch(_) => "StorageFetch",
            AppError::EncoderUnavailable(_) => "EncoderUnavailable",
            AppError::EncodingFailed(_) => "EncodingFailed",
            AppError::StorageUpload(_) => "StorageUpload",
            AppError::EncoderBusy { .. } => "EncoderBusy",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = match self {
            AppError::InternalWithSource { message, .. } => format!("Internal error: {}", message),
            other => other.to_string(),
        };

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_input() {
        let err = AppError::InvalidInput("Parameters are required".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Parameters are required");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_downstream_failures_collapse_to_500() {
        let errors = [
            AppError::StorageFetch("missing".to_string()),
            AppError::EncoderUnavailable("no such file".to_string()),
            AppError::EncodingFailed("exit status 1".to_string()),
            AppError::StorageUpload("timeout".to_string()),
            AppError::Internal("scratch".to_string()),
        ];
        for err in &errors {
            assert_eq!(err.http_status_code(), 500, "{}", err.error_type());
            assert_eq!(err.log_level(), LogLevel::Error);
        }

        let codes: std::collections::HashSet<_> = errors[..4].iter().map(|e| e.error_code()).collect();
        assert_eq!(codes.len(), 4, "each downstream kind keeps its own code");
    }

    #[test]
    fn test_downstream_messages_reach_client() {
        let err = AppError::EncoderUnavailable("No such file or directory".to_string());
        assert_eq!(
            err.client_message(),
            "FFmpeg not found: No such file or directory"
        );

        let err = AppError::StorageFetch("File not found: cover.png".to_string());
        assert!(err.client_message().contains("cover.png"));
    }

    #[test]
    fn test_internal_errors_keep_generic_message_but_expose_details() {
        let err = AppError::Internal("/tmp/stillcast-abc: permission denied".to_string());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(!err.is_sensitive());
        assert!(err.detailed_message().contains("permission denied"));
    }

    #[test]
    fn test_validation_errors_report_missing_parameters() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("audio", validator::ValidationError::new("required"));
        let err = AppError::from(errors);
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == MISSING_PARAMETERS_MESSAGE));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_payload_too_large_is_413() {
        let err = AppError::PayloadTooLarge("limit is 64 bytes".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[test]
    fn test_encoder_busy_is_503() {
        let err = AppError::EncoderBusy { waited_secs: 30 };
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "ENCODER_BUSY");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.client_message().contains("30"));
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("disk full").context("Failed to create scratch directory");
        let err = AppError::from(source);
        let details = err.detailed_message();
        assert!(details.contains("Failed to create scratch directory"));
        assert!(details.contains("disk full"));
    }
}
