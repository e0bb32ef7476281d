use async_trait::async_trait;

/// Result of recording one request in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    pub allowed: bool,
    /// Requests counted in the window after this hit; never above the limit
    pub count: u32,
}

/// Backend holding the per-window request counters.
///
/// `hit` must be atomic per key: concurrent hits for the same key and
/// bucket may never admit more than `limit` requests in total. The store
/// owns expiry of old buckets.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn hit(&self, key: &str, bucket: u64, limit: u32) -> WindowHit;
}
