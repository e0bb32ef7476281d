use crate::error::{StorageError, StorageResult};
use crate::naming::{content_type_for, display_name_of, stored_name};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// An upload persisted to the temp directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub stored_name: String,
    pub original_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// A reserved output location for a tool handler to write into.
#[derive(Debug, Clone)]
pub struct OutputSlot {
    pub path: PathBuf,
    pub stored_name: String,
    pub display_name: String,
}

/// An open output file ready to be streamed back to a client.
#[derive(Debug)]
pub struct DownloadHandle {
    pub file: fs::File,
    pub len: u64,
    pub display_name: String,
    pub content_type: &'static str,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub bytes_freed: u64,
    pub errors: usize,
}

/// The shared directory holding uploads and generated outputs.
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
}

impl TempStore {
    /// Create the directory if needed and return a store rooted there.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create temp directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(TempStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an upload under a fresh `{uuid}_{sanitized}` name.
    pub async fn save_upload(
        &self,
        original_name: &str,
        content_type: Option<String>,
        data: &[u8],
    ) -> StorageResult<StoredFile> {
        let stored_name = stored_name(original_name);
        let path = self.root.join(&stored_name);

        // create_new: a uuid collision must never overwrite another request's file
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        tracing::debug!(
            stored_name = %stored_name,
            size_bytes = data.len(),
            "Upload saved to temp directory"
        );

        Ok(StoredFile {
            path,
            stored_name,
            original_name: original_name.to_string(),
            content_type,
            size: data.len() as u64,
        })
    }

    /// Reserve a uniquely named output path. Nothing is written yet.
    pub fn allocate_output(&self, display_name: &str) -> OutputSlot {
        let stored_name = stored_name(display_name);
        let path = self.root.join(&stored_name);
        let display_name = display_name_of(&stored_name).to_string();
        OutputSlot {
            path,
            stored_name,
            display_name,
        }
    }

    /// Map a client-supplied name to a path inside the temp directory.
    ///
    /// Only bare file names are accepted; anything that could escape the
    /// directory is rejected.
    pub fn resolve(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
            || name.starts_with('.')
        {
            return Err(StorageError::InvalidName(
                "File name contains invalid characters".to_string(),
            ));
        }

        let path = self.root.join(name);
        if path.parent() != Some(self.root.as_path()) {
            return Err(StorageError::InvalidName(
                "File name resolves outside temp directory".to_string(),
            ));
        }
        Ok(path)
    }

    /// Open a stored output for download.
    pub async fn open_download(&self, name: &str) -> StorageResult<DownloadHandle> {
        let path = self.resolve(name)?;

        let meta = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            _ => return Err(StorageError::NotFound(name.to_string())),
        };

        let file = fs::File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::IoError(e),
        })?;

        Ok(DownloadHandle {
            file,
            len: meta.len(),
            display_name: display_name_of(name).to_string(),
            content_type: content_type_for(name),
        })
    }

    /// Delete a file; a file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every regular file whose modification time is older than `max_age`.
    pub async fn sweep(&self, max_age: Duration) -> StorageResult<SweepReport> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut report = SweepReport::default();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(_) => {
                    report.errors += 1;
                    continue;
                }
            };
            report.scanned += 1;

            let modified = meta.modified().unwrap_or(SystemTime::now());
            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    report.removed += 1;
                    report.bytes_freed += meta.len();
                }
                // Another request or sweep got there first.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    report.errors += 1;
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to remove expired temp file"
                    );
                }
            }
        }

        Ok(report)
    }
}
