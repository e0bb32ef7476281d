use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use filekit_core::AppError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// `GET /download/{filename}`: stream a generated output as an attachment.
///
/// Names that would leave the temp directory are reported as not found.
#[tracing::instrument(skip(state), fields(operation = "download"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let handle = state.store.open_download(&filename).await?;

    tracing::debug!(
        size_bytes = handle.len,
        content_type = handle.content_type,
        "Streaming output file"
    );

    let content_disposition = format!(
        "attachment; filename=\"{}\"",
        handle.display_name.replace('"', "")
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, handle.content_type)
        .header(header::CONTENT_LENGTH, handle.len)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(ReaderStream::new(handle.file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
