//! Filekit API Library
//!
//! HTTP handlers, middleware and application setup for the file tools
//! service.

pub mod error;
pub mod handlers;
pub mod job_queue;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use job_queue::JobQueue;
pub use jobs::{JobRecord, JobStatus, JobStore};
pub use state::AppState;
