//! Filekit Processing Library
//!
//! Everything between a saved upload and a generated output:
//! - typed, clamped form parameters ([`ToolParams`])
//! - upload validation against a tool's catalog entry ([`UploadValidator`])
//! - the tool handlers, one per category (image, document, video, audio)
//! - dispatch from a tool id to its handler ([`ToolRegistry`])
//!
//! Image and PDF work is CPU bound and runs on the blocking pool. Audio and
//! video work shells out to FFmpeg.

pub mod command;
pub mod document;
pub mod error;
pub mod image;
pub mod job;
pub mod media;
pub mod params;
pub mod registry;
pub mod validator;

pub use error::ProcessingError;
pub use job::{InputFile, ToolJob, ToolOutput, ToolResult};
pub use params::ToolParams;
pub use registry::{ProcessingSettings, ToolHandler, ToolRegistry};
pub use validator::{UploadPart, UploadValidator, ValidationError};
