use filekit_core::{AppError, ToolDescriptor};
use filekit_storage::naming::extension_of;

/// Upload validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file provided")]
    NoFile,

    #[error("No file selected")]
    NoFileSelected,

    #[error("File too large. Maximum size is {max_mb}MB.")]
    FileTooLarge { size: usize, max_mb: usize },

    #[error("This tool needs at least {min} files")]
    TooFewFiles { min: usize, got: usize },

    #[error("This tool takes a single file")]
    TooManyFiles,

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file: {0}")]
    EmptyFile(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// One file part as received, before it is written to disk.
#[derive(Debug, Clone, Copy)]
pub struct UploadPart<'a> {
    pub filename: &'a str,
    pub size: usize,
}

/// Checks a set of uploads against a tool's catalog entry.
///
/// Holds only the size ceiling; everything else comes from the
/// [`ToolDescriptor`].
pub struct UploadValidator {
    max_total_size: usize,
    max_size_mb: usize,
}

impl UploadValidator {
    pub fn new(max_size_mb: usize) -> Self {
        Self {
            max_total_size: max_size_mb.saturating_mul(1024 * 1024),
            max_size_mb,
        }
    }

    pub fn validate_total_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_total_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max_mb: self.max_size_mb,
            });
        }
        Ok(())
    }

    pub fn validate_extension(
        &self,
        tool: &ToolDescriptor,
        filename: &str,
    ) -> Result<(), ValidationError> {
        let extension = extension_of(filename)
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !tool.accepts_extension(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: tool.accepts.iter().map(|s| s.to_string()).collect(),
            });
        }
        Ok(())
    }

    /// Validate every part for `tool`. Parts with an empty filename are the
    /// browser's way of sending an unfilled file input and are skipped; the
    /// caller should drop them too.
    pub fn validate(&self, tool: &ToolDescriptor, parts: &[UploadPart<'_>]) -> Result<(), ValidationError> {
        if parts.is_empty() {
            return Err(ValidationError::NoFile);
        }

        let named: Vec<&UploadPart<'_>> = parts.iter().filter(|p| !p.filename.is_empty()).collect();
        if named.is_empty() {
            return Err(ValidationError::NoFileSelected);
        }

        let total: usize = named.iter().map(|p| p.size).sum();
        self.validate_total_size(total)?;

        let min = tool.arity.min_files();
        if named.len() < min {
            return Err(ValidationError::TooFewFiles {
                min,
                got: named.len(),
            });
        }
        if !tool.arity.allows_many() && named.len() > 1 {
            return Err(ValidationError::TooManyFiles);
        }

        for part in named {
            self.validate_extension(tool, part.filename)?;
            if part.size == 0 {
                return Err(ValidationError::EmptyFile(part.filename.to_string()));
            }
        }

        Ok(())
    }
}
