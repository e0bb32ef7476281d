//! Filekit Core Library
//!
//! Shared configuration, error types, the tool catalog and the page identity
//! model used by every filekit crate.

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;

pub use catalog::{find_tool, Category, InputArity, ToolDescriptor, TOOLS};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use identity::OptionalIdentity;
