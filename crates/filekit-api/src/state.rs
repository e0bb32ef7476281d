//! Application state shared by every handler.

use crate::job_queue::JobQueue;
use crate::jobs::JobStore;
use crate::services::ToolRunner;
use filekit_core::Config;
use filekit_infra::{RateLimiter, SystemMonitor};
use filekit_processing::UploadValidator;
use filekit_storage::TempStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: TempStore,
    pub validator: UploadValidator,
    pub runner: ToolRunner,
    pub jobs: Arc<JobStore>,
    pub queue: JobQueue,
    pub rate_limit: RateLimitState,
    pub system: SystemMonitor,
}

/// What the rate limit middleware needs, kept apart so it can be layered
/// with its own state.
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: RateLimiter,
    pub trusted_proxy_count: usize,
}
