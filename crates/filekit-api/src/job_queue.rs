use filekit_core::{AppError, ErrorMetadata};
use filekit_processing::ToolJob;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::jobs::JobStore;
use crate::models::ProcessResponse;
use crate::services::ToolRunner;

#[derive(Debug)]
struct QueuedJob {
    id: Uuid,
    job: ToolJob,
}

/// Admission side of asynchronous processing.
///
/// Submissions go into a bounded channel. A single dispatcher drains it,
/// waiting for a worker slot before taking the next job, so a full pool
/// backs up into the channel and a full channel rejects new work.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<QueuedJob>,
    jobs: Arc<JobStore>,
    runner: ToolRunner,
}

impl JobQueue {
    pub fn start(runner: ToolRunner, jobs: Arc<JobStore>, queue_size: usize) -> Self {
        let queue_size = queue_size.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        tokio::spawn(Self::dispatcher(rx, runner.clone(), jobs.clone()));

        tracing::info!(queue_size, "Job queue initialized with bounded channel");

        Self { tx, jobs, runner }
    }

    /// Enqueue a job. When the queue is full the job's inputs are deleted
    /// and [`AppError::QueueFull`] is returned.
    #[tracing::instrument(skip(self, job), fields(tool_id = job.tool_id()))]
    pub async fn submit(&self, job: ToolJob) -> Result<Uuid, AppError> {
        let id = self.jobs.create(job.tool_id()).await;

        match self.tx.try_send(QueuedJob { id, job }) {
            Ok(()) => {
                tracing::info!(job_id = %id, "Job enqueued");
                Ok(id)
            }
            Err(e) => {
                self.jobs.remove(id).await;
                let error = match &e {
                    TrySendError::Full(_) => {
                        tracing::warn!("Job queue is full, rejecting job");
                        AppError::QueueFull
                    }
                    TrySendError::Closed(_) => AppError::Internal("Job queue closed".to_string()),
                };
                let queued = e.into_inner();
                self.runner.discard_inputs(&queued.job).await;
                Err(error)
            }
        }
    }

    async fn dispatcher(mut rx: mpsc::Receiver<QueuedJob>, runner: ToolRunner, jobs: Arc<JobStore>) {
        while let Some(QueuedJob { id, job }) = rx.recv().await {
            let permit = match runner.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    runner.discard_inputs(&job).await;
                    jobs.fail(id, e.client_message()).await;
                    continue;
                }
            };

            let runner = runner.clone();
            let jobs = jobs.clone();
            tokio::spawn(async move {
                jobs.mark_running(id).await;
                match runner.execute(job, permit).await {
                    Ok(result) => {
                        tracing::info!(job_id = %id, "Job succeeded");
                        jobs.succeed(id, ProcessResponse::from(result)).await;
                    }
                    Err(e) => {
                        tracing::warn!(job_id = %id, error = %e, "Job failed");
                        jobs.fail(id, e.client_message()).await;
                    }
                }
            });
        }

        tracing::debug!("Job queue dispatcher stopped");
    }
}
