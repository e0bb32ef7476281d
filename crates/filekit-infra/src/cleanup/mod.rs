//! Background cleanup of the temp directory and expired in-memory records.

mod service;

pub use service::{CleanupReport, CleanupService, ExpiringRecords};
