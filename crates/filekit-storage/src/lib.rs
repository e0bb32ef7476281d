//! Filekit Storage Library
//!
//! The shared temporary directory that holds both uploaded inputs and
//! generated outputs.
//!
//! # Name format
//!
//! Every stored file is named `{uuid}_{sanitized_name}`. The uuid prefix keeps
//! concurrent requests from colliding and makes names unguessable; the suffix
//! is the name shown to the user on download. Names must not contain path
//! separators or `..`.

pub mod error;
pub mod naming;
pub mod temp_store;

pub use error::{StorageError, StorageResult};
pub use naming::{content_type_for, display_name_of, sanitize_filename};
pub use temp_store::{DownloadHandle, OutputSlot, StoredFile, SweepReport, TempStore};
