//! Multipart intake: split a form into file parts and text fields, then
//! persist the accepted files to the temp directory.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use filekit_core::AppError;
use filekit_processing::{InputFile, UploadPart};
use filekit_storage::{sanitize_filename, TempStore};
use std::collections::HashMap;

/// Form field names that carry uploads.
const FILE_FIELDS: [&str; 2] = ["file", "files"];

#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<ReceivedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn parts(&self) -> Vec<UploadPart<'_>> {
        self.files
            .iter()
            .map(|f| UploadPart {
                filename: &f.filename,
                size: f.data.len(),
            })
            .collect()
    }
}

fn multipart_error(err: MultipartError, max_upload_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB.",
            max_upload_mb
        ))
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read the whole multipart body.
///
/// Parts named `file` or `files` are uploads, in order of arrival. Every
/// other part is a text parameter; a repeated name keeps its last value.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_upload_mb: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_mb))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if FILE_FIELDS.contains(&name.as_str()) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_upload_mb))?;
            form.files.push(ReceivedFile {
                filename,
                content_type,
                data,
            });
        } else if !name.is_empty() {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, max_upload_mb))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Persist every named upload. If any write fails the files already
/// written are removed before the error is returned.
pub async fn save_inputs(
    store: &TempStore,
    files: Vec<ReceivedFile>,
) -> Result<Vec<InputFile>, AppError> {
    let mut saved: Vec<InputFile> = Vec::with_capacity(files.len());

    for file in files.into_iter().filter(|f| !f.filename.is_empty()) {
        let original_name = sanitize_filename(&file.filename);
        match store
            .save_upload(&original_name, file.content_type, &file.data)
            .await
        {
            Ok(stored) => saved.push(InputFile {
                path: stored.path,
                original_name,
            }),
            Err(e) => {
                for input in &saved {
                    if let Err(remove_err) = store.remove(&input.path).await {
                        tracing::warn!(error = %remove_err, path = %input.path.display(), "Failed to remove input");
                    }
                }
                return Err(AppError::Internal(format!("Failed to save upload: {}", e)));
            }
        }
    }

    Ok(saved)
}
