//! Filekit Infrastructure Library
//!
//! Shared infrastructure used by the HTTP service:
//! - Middleware (request ID, security headers)
//! - Telemetry initialization
//! - Rate limiting
//! - Temp directory cleanup
//! - Host resource statistics

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "cleanup")]
pub mod cleanup;

#[cfg(feature = "system-stats")]
pub mod system;

#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    SecurityHeaders,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{
    InMemoryRateLimitStore, RateDecision, RateLimitStore, RateLimiter, WindowHit,
};

#[cfg(feature = "cleanup")]
pub use cleanup::{CleanupReport, CleanupService, ExpiringRecords};

#[cfg(feature = "system-stats")]
pub use system::{SystemMonitor, SystemStats};
