//! In-memory records of asynchronously submitted jobs.

use crate::models::ProcessResponse;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filekit_infra::ExpiringRecords;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub tool_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Default)]
pub struct JobStore {
    records: RwLock<HashMap<Uuid, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queued job and return its id.
    pub async fn create(&self, tool_id: &str) -> Uuid {
        let now = Utc::now();
        let job_id = Uuid::new_v4();
        self.records.write().await.insert(
            job_id,
            JobRecord {
                job_id,
                tool_id: tool_id.to_string(),
                status: JobStatus::Queued,
                created_at: now,
                updated_at: now,
                result: None,
                error: None,
            },
        );
        job_id
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.records.read().await.get(&job_id).cloned()
    }

    pub async fn remove(&self, job_id: Uuid) {
        self.records.write().await.remove(&job_id);
    }

    async fn update(&self, job_id: Uuid, apply: impl FnOnce(&mut JobRecord)) {
        if let Some(record) = self.records.write().await.get_mut(&job_id) {
            apply(record);
            record.updated_at = Utc::now();
        }
    }

    pub async fn mark_running(&self, job_id: Uuid) {
        self.update(job_id, |r| r.status = JobStatus::Running).await;
    }

    pub async fn succeed(&self, job_id: Uuid, result: ProcessResponse) {
        self.update(job_id, |r| {
            r.status = JobStatus::Succeeded;
            r.result = Some(result);
        })
        .await;
    }

    pub async fn fail(&self, job_id: Uuid, error: String) {
        self.update(job_id, |r| {
            r.status = JobStatus::Failed;
            r.error = Some(error);
        })
        .await;
    }
}

#[async_trait]
impl ExpiringRecords for JobStore {
    fn name(&self) -> &'static str {
        "jobs"
    }

    /// Finished jobs are dropped once their outputs would have been swept.
    async fn expire_older_than(&self, max_age: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !(r.status.is_finished() && r.updated_at < cutoff));
        before - records.len()
    }
}
