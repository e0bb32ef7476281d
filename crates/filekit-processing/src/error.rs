use filekit_core::AppError;
use filekit_storage::StorageError;

/// Failure raised by a tool handler.
///
/// Handlers never build HTTP errors themselves; the dispatch boundary
/// converts with [`ProcessingError::into_app_error`].
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The library rejected the input as malformed. The message is safe to
    /// show to the client.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{tool} exited with {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Failed(String),
}

impl ProcessingError {
    /// Map a handler failure to the request-level error for `tool_id`.
    pub fn into_app_error(self, tool_id: &str) -> AppError {
        match self {
            ProcessingError::UnknownTool(id) => AppError::UnknownTool(id),
            ProcessingError::InvalidInput(msg) => AppError::InvalidFile(msg),
            ProcessingError::Image(image::ImageError::Decoding(_))
            | ProcessingError::Image(image::ImageError::Unsupported(_)) => {
                AppError::InvalidFile("Could not decode image".to_string())
            }
            ProcessingError::Pdf(_) => AppError::InvalidFile("Could not read PDF".to_string()),
            // Decoder libraries panic on some malformed inputs.
            ProcessingError::Join(e) if e.is_panic() => {
                AppError::InvalidFile("The file could not be processed".to_string())
            }
            ProcessingError::DependencyMissing(dependency) => {
                AppError::ToolUnavailable { dependency }
            }
            other => AppError::ProcessingFailed {
                tool_id: tool_id.to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_core::ErrorMetadata;

    #[test]
    fn test_missing_binary_maps_to_unavailable() {
        let err = ProcessingError::DependencyMissing("ffmpeg".to_string()).into_app_error("video-mute");
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(
            err.client_message(),
            "Tool temporarily unavailable. Missing dependency: ffmpeg"
        );
    }

    #[test]
    fn test_invalid_input_maps_to_unprocessable() {
        let err = ProcessingError::InvalidInput("Invalid page range".to_string())
            .into_app_error("pdf-splitter");
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.client_message(), "Invalid page range");
    }

    #[tokio::test]
    async fn test_worker_panic_maps_to_invalid_file() {
        let join_err = tokio::task::spawn_blocking(|| -> u8 { panic!("unexpected encoding") })
            .await
            .unwrap_err();
        let err = ProcessingError::from(join_err).into_app_error("pdf-to-text");
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.client_message(), "The file could not be processed");
    }

    #[test]
    fn test_command_failure_hides_stderr_from_client() {
        let err = ProcessingError::CommandFailed {
            tool: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        }
        .into_app_error("video-trim");
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Processing failed");
        assert!(err.detailed_message().contains("moov atom"));
    }
}
