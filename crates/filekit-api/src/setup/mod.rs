//! Application setup and initialization
//!
//! Builds the shared state and router, and starts the background cleanup
//! task. Integration tests use [`build_app`] directly.

pub mod routes;
pub mod server;

use crate::job_queue::JobQueue;
use crate::jobs::JobStore;
use crate::services::ToolRunner;
use crate::state::{AppState, RateLimitState};
use anyhow::{Context, Result};
use filekit_core::Config;
use filekit_infra::{CleanupService, RateLimiter, SystemMonitor};
use filekit_processing::{ProcessingSettings, ToolRegistry, UploadValidator};
use filekit_storage::TempStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Build every service the handlers share. Must run inside a tokio runtime.
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    config.validate().context("Configuration validation failed")?;

    let store = TempStore::new(&config.temp_dir)
        .await
        .context("Failed to prepare temp directory")?;

    let registry = Arc::new(ToolRegistry::new(
        store.clone(),
        ProcessingSettings::from_config(&config),
    ));
    let runner = ToolRunner::new(
        registry,
        store.clone(),
        config.max_concurrent_jobs,
        Duration::from_secs(config.process_timeout_secs),
    );
    let jobs = Arc::new(JobStore::new());
    let queue = JobQueue::start(runner.clone(), jobs.clone(), config.job_queue_size);

    let rate_limit = RateLimitState {
        limiter: RateLimiter::in_memory(config.rate_limit_per_minute),
        trusted_proxy_count: config.trusted_proxy_count,
    };

    tracing::info!(
        temp_dir = %config.temp_dir.display(),
        max_concurrent_jobs = config.max_concurrent_jobs,
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        validator: UploadValidator::new(config.max_upload_size_mb),
        system: SystemMonitor::new(config.temp_dir.clone()),
        store,
        runner,
        jobs,
        queue,
        rate_limit,
        config,
    }))
}

/// State and router without background tasks.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let state = build_state(config).await?;
    let router = routes::setup_routes(&state.config, state.clone())?;
    Ok((state, router))
}

/// Initialize the entire application and start the temp directory sweep.
/// Cancelling `shutdown` stops the sweep.
pub async fn initialize_app(
    config: Config,
    shutdown: CancellationToken,
) -> Result<(Arc<AppState>, axum::Router)> {
    let (state, router) = build_app(config).await?;

    let cleanup = Arc::new(
        CleanupService::new(
            state.store.clone(),
            Duration::from_secs(state.config.temp_retention_secs),
            Duration::from_secs(state.config.cleanup_interval_secs.max(1)),
        )
        .with_records(state.jobs.clone()),
    );
    cleanup.start(shutdown);

    Ok((state, router))
}
