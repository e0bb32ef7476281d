use crate::error::HttpAppError;
use crate::jobs::JobRecord;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use filekit_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// `GET /jobs/{job_id}`
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobRecord>, HttpAppError> {
    let not_found = || AppError::NotFound("Job not found".to_string());

    let job_id = Uuid::parse_str(&job_id).map_err(|_| not_found())?;
    let record = state.jobs.get(job_id).await.ok_or_else(not_found)?;
    Ok(Json(record))
}
