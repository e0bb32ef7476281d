//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. Each variant
//! self-describes how it is presented over HTTP through [`ErrorMetadata`], so
//! the API layer never has to match on variants to pick a status code.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors such as validation failures
    Debug,
    /// Recoverable issues such as throttling or a missing tool binary
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNKNOWN_TOOL")
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
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// The uploaded file was accepted but the processing library rejected it.
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Tool temporarily unavailable: missing dependency {dependency}")]
    ToolUnavailable { dependency: String },

    #[error("Processing failed for {tool_id}: {message}")]
    ProcessingFailed { tool_id: String, message: String },

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Processing queue is full")]
    QueueFull,

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

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
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
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("The file may have expired; process it again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnknownTool(_) => (
            404,
            "UNKNOWN_TOOL",
            false,
            Some("Pick a tool from /api/tools"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFile(_) => (
            422,
            "INVALID_FILE",
            false,
            Some("Check the file is not corrupt and matches the tool"),
            false,
            LogLevel::Debug,
        ),
        AppError::ToolUnavailable { .. } => (
            503,
            "TOOL_UNAVAILABLE",
            true,
            Some("Try again later or use another tool"),
            false,
            LogLevel::Warn,
        ),
        AppError::ProcessingFailed { .. } => (
            500,
            "PROCESSING_FAILED",
            true,
            Some("Retry, or try a different file"),
            true,
            LogLevel::Error,
        ),
        AppError::RateLimited { .. } => (
            429,
            "RATE_LIMITED",
            true,
            Some("Wait a minute and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::QueueFull => (
            503,
            "QUEUE_FULL",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::UnknownTool(_) => "UnknownTool",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::InvalidFile(_) => "InvalidFile",
            AppError::ToolUnavailable { .. } => "ToolUnavailable",
            AppError::ProcessingFailed { .. } => "ProcessingFailed",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::QueueFull => "QueueFull",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

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
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::UnknownTool(_) => "Unknown tool".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::InvalidFile(ref msg) => msg.clone(),
            AppError::ToolUnavailable { dependency } => format!(
                "Tool temporarily unavailable. Missing dependency: {}",
                dependency
            ),
            AppError::ProcessingFailed { .. } => "Processing failed".to_string(),
            AppError::RateLimited { .. } => {
                "Rate limit exceeded. Please try again in a minute.".to_string()
            }
            AppError::QueueFull => {
                "Processing queue is full, please try again later".to_string()
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
