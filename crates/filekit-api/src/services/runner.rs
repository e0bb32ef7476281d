use filekit_core::AppError;
use filekit_processing::{ToolJob, ToolRegistry, ToolResult};
use filekit_storage::TempStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Runs tools under the bounded worker pool.
///
/// Synchronous requests and queued jobs share one semaphore, so no more
/// than `max_concurrent` conversions run at once however they were
/// submitted. Inputs are deleted after every run.
#[derive(Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    store: TempStore,
    pool: Arc<Semaphore>,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(
        registry: Arc<ToolRegistry>,
        store: TempStore,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            pool: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AppError> {
        self.pool
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Internal("Worker pool closed".to_string()))
    }

    /// Wait for a worker slot, then run the job.
    pub async fn run(&self, job: ToolJob) -> Result<ToolResult, AppError> {
        let permit = match self.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                self.discard_inputs(&job).await;
                return Err(e);
            }
        };
        self.execute(job, permit).await
    }

    /// Run the job on an already acquired worker slot.
    ///
    /// The permit travels with the job, so work still running on a blocking
    /// thread after a timeout keeps its slot until it finishes.
    #[tracing::instrument(skip(self, job, permit), fields(tool_id = job.tool_id(), inputs = job.inputs.len()))]
    pub async fn execute(
        &self,
        job: ToolJob,
        permit: OwnedSemaphorePermit,
    ) -> Result<ToolResult, AppError> {
        let job = job.holding(permit);
        let tool_id = job.tool_id();
        let outcome = tokio::time::timeout(self.timeout, self.registry.dispatch(&job)).await;
        self.discard_inputs(&job).await;

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(e.into_app_error(tool_id)),
            Err(_) => {
                tracing::error!(
                    tool_id,
                    timeout_secs = self.timeout.as_secs(),
                    "Tool timed out"
                );
                Err(AppError::ProcessingFailed {
                    tool_id: tool_id.to_string(),
                    message: format!("timed out after {}s", self.timeout.as_secs()),
                })
            }
        }
    }

    /// Delete the job's uploaded inputs.
    pub async fn discard_inputs(&self, job: &ToolJob) {
        for input in &job.inputs {
            if let Err(e) = self.store.remove(&input.path).await {
                tracing::warn!(
                    error = %e,
                    path = %input.path.display(),
                    "Failed to delete input file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_core::{find_tool, ErrorMetadata};
    use filekit_processing::{InputFile, ProcessingSettings, ToolParams};

    async fn runner(dir: &std::path::Path) -> (TempStore, ToolRunner) {
        let store = TempStore::new(dir).await.unwrap();
        let registry = Arc::new(ToolRegistry::new(store.clone(), ProcessingSettings::default()));
        let runner = ToolRunner::new(registry, store.clone(), 2, Duration::from_secs(30));
        (store, runner)
    }

    #[tokio::test]
    async fn test_inputs_deleted_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = runner(dir.path()).await;

        let stored = store
            .save_upload("broken.png", None, b"not an image")
            .await
            .unwrap();
        let job = ToolJob::new(
            find_tool("image-grayscale").unwrap(),
            vec![InputFile {
                path: stored.path.clone(),
                original_name: "broken.png".to_string(),
            }],
            ToolParams::default(),
        );

        let err = runner.run(job).await.unwrap_err();
        assert_eq!(err.http_status_code(), 422);
        assert!(!stored.path.exists());
    }

    #[tokio::test]
    async fn test_inputs_deleted_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = runner(dir.path()).await;

        let stored = store
            .save_upload("notes.txt", None, b"hello world")
            .await
            .unwrap();
        let job = ToolJob::new(
            find_tool("text-to-pdf").unwrap(),
            vec![InputFile {
                path: stored.path.clone(),
                original_name: "notes.txt".to_string(),
            }],
            ToolParams::default(),
        );

        let result = runner.run(job).await.unwrap();
        assert_eq!(result.outputs.len(), 1);
        assert!(result.outputs[0].path.exists());
        assert!(!stored.path.exists());
    }
}
