//! Error types module
//!
//! This module provides the application-level error type for the upload pipeline.
//! Lower layers keep their own `thiserror` enums (`StorageError`, `UploadError`) and
//! convert into `AppError` at the boundary handed to the HTTP layer.

use std::error::Error as StdError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected payloads over a limit
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the same upload may succeed if sent again later
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote retries and the local fallback both failed.
    #[error("Upload failed: {message}")]
    UploadFailed {
        message: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wrap a terminal upload error, keeping it as the source.
    pub fn upload_failed<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AppError::UploadFailed {
            message: err.to_string(),
            source: Box::new(err),
        }
    }

    /// Display message followed by the chain of sources
    pub fn detailed_message(&self) -> String {
        let mut details = self.to_string();

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

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, true, LogLevel::Error),
        AppError::UploadFailed { .. } => (503, "UPLOAD_FAILED", true, true, LogLevel::Error),
        AppError::Config(_) => (500, "CONFIGURATION_ERROR", false, true, LogLevel::Error),
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

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::UploadFailed { .. } => "File could not be stored".to_string(),
            AppError::Config(_) => "Service misconfigured".to_string(),
        }
    }
}
