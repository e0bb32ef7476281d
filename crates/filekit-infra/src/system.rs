//! Host and process resource statistics for the health endpoint.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Disks, Pid, System};

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub cpu_percent: f32,
    pub cpu_count: usize,
    pub memory_percent: f64,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub process_memory_mb: Option<u64>,
    /// Free space on the disk holding the temp directory
    pub disk_free_mb: Option<u64>,
    pub uptime_secs: u64,
}

#[derive(Clone)]
pub struct SystemMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    temp_dir: PathBuf,
    started_at: Instant,
}

impl SystemMonitor {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();

        Self {
            system: Arc::new(Mutex::new(system)),
            pid: sysinfo::get_current_pid().ok(),
            temp_dir: temp_dir.into(),
            started_at: Instant::now(),
        }
    }

    /// Refresh and read the current figures. CPU usage is measured since the
    /// previous call, so the first snapshot after startup may read zero.
    pub fn snapshot(&self) -> SystemStats {
        let (cpu_percent, cpu_count, used, total, process_memory) = match self.system.lock() {
            Ok(mut system) => {
                system.refresh_cpu();
                system.refresh_memory();
                let process_memory = self.pid.and_then(|pid| {
                    system.refresh_process(pid);
                    system.process(pid).map(|p| p.memory() / MB)
                });
                (
                    system.global_cpu_info().cpu_usage(),
                    system.cpus().len(),
                    system.used_memory(),
                    system.total_memory(),
                    process_memory,
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "System stats lock poisoned");
                (0.0, 0, 0, 0, None)
            }
        };

        let memory_percent = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };

        SystemStats {
            cpu_percent,
            cpu_count,
            memory_percent,
            memory_used_mb: used / MB,
            memory_total_mb: total / MB,
            process_memory_mb: process_memory,
            disk_free_mb: disk_free(&self.temp_dir).map(|b| b / MB),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    /// [`snapshot`](Self::snapshot) on the blocking pool.
    pub async fn snapshot_async(&self) -> SystemStats {
        let monitor = self.clone();
        match tokio::task::spawn_blocking(move || monitor.snapshot()).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "System stats task failed");
                SystemStats {
                    cpu_percent: 0.0,
                    cpu_count: 0,
                    memory_percent: 0.0,
                    memory_used_mb: 0,
                    memory_total_mb: 0,
                    process_memory_mb: None,
                    disk_free_mb: None,
                    uptime_secs: self.started_at.elapsed().as_secs(),
                }
            }
        }
    }
}

/// Available bytes on the disk with the longest mount point containing `path`.
fn disk_free(path: &Path) -> Option<u64> {
    let path = path.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();
    disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_memory() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = SystemMonitor::new(dir.path());
        let stats = monitor.snapshot();

        assert!(stats.memory_total_mb > 0);
        assert!((0.0..=100.0).contains(&stats.memory_percent));
        assert!(stats.cpu_count > 0);
    }
}
