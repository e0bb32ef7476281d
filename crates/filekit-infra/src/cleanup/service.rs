use async_trait::async_trait;
use filekit_storage::{SweepReport, TempStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// In-memory records that expire alongside the files they point at.
#[async_trait]
pub trait ExpiringRecords: Send + Sync {
    fn name(&self) -> &'static str;

    /// Drop records older than `max_age`; returns how many were removed.
    async fn expire_older_than(&self, max_age: Duration) -> usize;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub files: SweepReport,
    pub records_expired: usize,
}

#[derive(Clone)]
pub struct CleanupService {
    store: TempStore,
    retention: Duration,
    interval: Duration,
    records: Vec<Arc<dyn ExpiringRecords>>,
}

impl CleanupService {
    pub fn new(store: TempStore, retention: Duration, interval: Duration) -> Self {
        Self {
            store,
            retention,
            interval,
            records: Vec::new(),
        }
    }

    pub fn with_records(mut self, records: Arc<dyn ExpiringRecords>) -> Self {
        self.records.push(records);
        self
    }

    /// Start the periodic sweep. The first pass runs immediately so files
    /// left over from a previous process are reclaimed at startup.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Cleanup task stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }

    /// Run one sweep. Failures are logged and never stop the service.
    #[tracing::instrument(skip(self), fields(cleanup.retention_secs = self.retention.as_secs()))]
    pub async fn run_once(&self) -> CleanupReport {
        let files = match self.store.sweep(self.retention).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    temp_dir = %self.store.root().display(),
                    "Temp directory sweep failed"
                );
                SweepReport::default()
            }
        };

        let mut records_expired = 0;
        for records in &self.records {
            let expired = records.expire_older_than(self.retention).await;
            if expired > 0 {
                tracing::debug!(records = records.name(), expired, "Expired records");
            }
            records_expired += expired;
        }

        if files.removed > 0 || records_expired > 0 || files.errors > 0 {
            tracing::info!(
                scanned = files.scanned,
                removed = files.removed,
                bytes_freed = files.bytes_freed,
                errors = files.errors,
                records_expired,
                "Cleanup completed"
            );
        }

        CleanupReport {
            files,
            records_expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;
    use tempfile::tempdir;

    struct CountingRecords(AtomicUsize);

    #[async_trait]
    impl ExpiringRecords for CountingRecords {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn expire_older_than(&self, _max_age: Duration) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst);
            3
        }
    }

    #[tokio::test]
    async fn test_run_once_sweeps_files_and_records() {
        let dir = tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();

        let old = store.save_upload("old.pdf", None, b"old").await.unwrap();
        std::fs::OpenOptions::new()
            .write(true)
            .open(&old.path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(7200))
            .unwrap();
        let fresh = store.save_upload("fresh.pdf", None, b"fresh").await.unwrap();

        let records = Arc::new(CountingRecords(AtomicUsize::new(0)));
        let service = CleanupService::new(store, Duration::from_secs(3600), Duration::from_secs(300))
            .with_records(records.clone());

        let report = service.run_once().await;

        assert_eq!(report.files.removed, 1);
        assert_eq!(report.records_expired, 3);
        assert_eq!(records.0.load(Ordering::SeqCst), 1);
        assert!(!old.path.exists());
        assert!(fresh.path.exists());
    }

    #[tokio::test]
    async fn test_start_stops_on_cancel() {
        let dir = tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();
        let service = Arc::new(CleanupService::new(
            store,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        ));

        let token = CancellationToken::new();
        let handle = service.start(token.clone());
        token.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
