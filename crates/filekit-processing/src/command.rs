//! Running external binaries.

use crate::error::{ProcessingError, ProcessingResult};
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Stderr kept in an error, from the end where ffmpeg puts the cause.
const MAX_STDERR_LEN: usize = 2000;

/// Run `program` to completion, capturing stdout and stderr.
///
/// A binary that cannot be found becomes [`ProcessingError::DependencyMissing`]
/// named after `label`; a non-zero exit becomes
/// [`ProcessingError::CommandFailed`]. The child is killed if the returned
/// future is dropped.
pub async fn run<I, S>(label: &str, program: &str, args: I) -> ProcessingResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessingError::DependencyMissing(label.to_string()),
            _ => ProcessingError::Io(e),
        })?;

    if !output.status.success() {
        return Err(ProcessingError::CommandFailed {
            tool: label.to_string(),
            status: output.status.to_string(),
            stderr: tail(&String::from_utf8_lossy(&output.stderr), MAX_STDERR_LEN),
        });
    }

    Ok(output)
}

fn tail(text: &str, max: usize) -> String {
    let text = text.trim();
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    text.chars().skip(count - max).collect()
}
