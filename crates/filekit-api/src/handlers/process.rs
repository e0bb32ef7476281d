use crate::error::HttpAppError;
use crate::models::{JobAccepted, ProcessResponse};
use crate::services::{read_upload_form, save_inputs};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filekit_core::catalog::{find_tool, ToolDescriptor};
use filekit_core::AppError;
use filekit_processing::{ToolJob, ToolParams};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    #[default]
    Sync,
    Async,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessQuery {
    #[serde(default)]
    pub mode: ProcessMode,
}

/// `POST /process/{tool_id}`
pub async fn process_tool(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<String>,
    Query(query): Query<ProcessQuery>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let tool = find_tool(&tool_id).ok_or_else(|| AppError::UnknownTool(tool_id.clone()))?;
    run_tool(state, tool, query.mode, multipart).await
}

/// `POST /process/{category}/{tool_id}`; the tool must belong to the category.
pub async fn process_tool_in_category(
    State(state): State<Arc<AppState>>,
    Path((category, tool_id)): Path<(String, String)>,
    Query(query): Query<ProcessQuery>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let tool = find_tool(&tool_id).ok_or_else(|| AppError::UnknownTool(tool_id.clone()))?;
    if tool.category.as_str() != category {
        return Err(AppError::NotFound("Invalid category".to_string()).into());
    }
    run_tool(state, tool, query.mode, multipart).await
}

#[tracing::instrument(skip(state, tool, multipart), fields(tool_id = tool.id, mode = ?mode))]
async fn run_tool(
    state: Arc<AppState>,
    tool: &'static ToolDescriptor,
    mode: ProcessMode,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_upload_form(multipart, state.config.max_upload_size_mb).await?;
    state.validator.validate(tool, &form.parts())?;

    let inputs = save_inputs(&state.store, form.files).await?;
    let job = ToolJob::new(tool, inputs, ToolParams::new(form.fields));

    match mode {
        ProcessMode::Async => {
            let job_id = state.queue.submit(job).await?;
            Ok((StatusCode::ACCEPTED, Json(JobAccepted::new(job_id))).into_response())
        }
        ProcessMode::Sync => {
            let result = state.runner.run(job).await?;
            tracing::info!(outputs = result.outputs.len(), "Tool completed");
            Ok(Json(ProcessResponse::from(result)).into_response())
        }
    }
}
