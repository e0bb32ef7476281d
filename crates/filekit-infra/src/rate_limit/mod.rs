//! Per-client request rate limiting
//!
//! Requests are counted in fixed one-minute windows keyed by client address.
//! The counters live behind [`RateLimitStore`] so a shared backend can
//! replace the in-process map without changing the HTTP behavior.

mod memory;
mod store;

pub use memory::InMemoryRateLimitStore;
pub use store::{RateLimitStore, WindowHit};

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const WINDOW_SECS: u64 = 60;

/// Outcome of one rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window closes
    pub retry_after_secs: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    limit_per_minute: u32,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, limit_per_minute: u32) -> Self {
        Self {
            store,
            limit_per_minute,
        }
    }

    /// In-memory limiter with the default shard count.
    pub fn in_memory(limit_per_minute: u32) -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()), limit_per_minute)
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    /// Count a request from `client` against the current minute.
    pub async fn check(&self, client: &str) -> RateDecision {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.check_at(client, now).await
    }

    /// Same as [`check`](Self::check) with an explicit unix timestamp.
    pub async fn check_at(&self, client: &str, unix_secs: u64) -> RateDecision {
        let bucket = unix_secs / WINDOW_SECS;
        let retry_after_secs = WINDOW_SECS - unix_secs % WINDOW_SECS;
        let hit = self.store.hit(client, bucket, self.limit_per_minute).await;

        if !hit.allowed {
            tracing::debug!(
                client_ip = %client,
                bucket,
                limit = self.limit_per_minute,
                "Rate limit exceeded"
            );
        }

        RateDecision {
            allowed: hit.allowed,
            limit: self.limit_per_minute,
            remaining: self.limit_per_minute.saturating_sub(hit.count),
            retry_after_secs,
        }
    }
}
