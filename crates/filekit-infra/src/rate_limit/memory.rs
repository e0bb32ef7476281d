use super::store::{RateLimitStore, WindowHit};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tokio::sync::Mutex;

const DEFAULT_SHARDS: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Window {
    bucket: u64,
    count: u32,
}

/// Sharded fixed-window counters held in process memory.
///
/// Keys hash to one of several mutex-guarded maps to spread lock
/// contention. Each check drops the windows of its shard that belong to
/// an earlier minute.
pub struct InMemoryRateLimitStore {
    shards: Vec<Mutex<HashMap<String, Window>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    fn shard(&self, key: &str) -> &Mutex<HashMap<String, Window>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Number of live windows across all shards.
    pub async fn tracked_keys(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.len();
        }
        total
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, bucket: u64, limit: u32) -> WindowHit {
        let mut windows = self.shard(key).lock().await;

        let before = windows.len();
        windows.retain(|_, window| window.bucket >= bucket);
        let pruned = before - windows.len();
        if pruned > 0 {
            tracing::trace!(pruned, "Pruned stale rate limit windows");
        }

        let window = windows
            .entry(key.to_string())
            .or_insert(Window { bucket, count: 0 });

        if window.bucket < bucket {
            *window = Window { bucket, count: 0 };
        }

        if window.count < limit {
            window.count += 1;
            WindowHit {
                allowed: true,
                count: window.count,
            }
        } else {
            WindowHit {
                allowed: false,
                count: window.count,
            }
        }
    }
}
