//! Audio and video tools, all backed by the FFmpeg binary.
//!
//! Each tool is planned as a pure function of the job (argument list,
//! output name, message) and then executed by [`MediaRunner`]. Planning
//! never touches the filesystem, which keeps it testable without FFmpeg.

pub mod audio;
pub mod video;

pub use audio::AudioToolHandler;
pub use video::VideoToolHandler;

use crate::command;
use crate::error::{ProcessingError, ProcessingResult};
use crate::job::{InputFile, ToolOutput, ToolResult};
use filekit_storage::TempStore;
use std::ffi::OsStr;
use std::path::Path;

/// Thin wrapper over the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct MediaRunner {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaRunner {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    pub async fn ffmpeg(&self, args: &[String]) -> ProcessingResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        command::run("ffmpeg", &self.ffmpeg_path, args).await?;
        Ok(())
    }

    /// Container duration in seconds.
    pub async fn duration(&self, input: &Path) -> ProcessingResult<f64> {
        let output = command::run(
            "ffprobe",
            &self.ffprobe_path,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-show_entries"),
                OsStr::new("format=duration"),
                OsStr::new("-of"),
                OsStr::new("default=noprint_wrappers=1:nokey=1"),
                input.as_os_str(),
            ],
        )
        .await?;

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .map_err(|_| ProcessingError::InvalidInput("Could not read media duration".to_string()))
    }
}

/// An FFmpeg invocation for one tool, minus the output path.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPlan {
    pub args: Vec<String>,
    pub display_name: String,
    pub message: String,
}

impl MediaPlan {
    /// Start an argument list reading `inputs` in order.
    fn reading(inputs: &[&InputFile]) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];
        for input in inputs {
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }
        args
    }
}

/// Lowercase extension of the original upload, if it is one of `allowed`.
fn input_extension(input: &InputFile, allowed: &[&str], fallback: &'static str) -> String {
    input
        .original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| allowed.contains(&ext.as_str()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Run `plan`, writing to a freshly allocated output. A failed run leaves no
/// partial output behind.
async fn execute(store: &TempStore, runner: &MediaRunner, plan: MediaPlan) -> ProcessingResult<ToolResult> {
    let slot = store.allocate_output(&plan.display_name);
    let mut args = plan.args;
    args.push(slot.path.to_string_lossy().to_string());

    if let Err(e) = runner.ffmpeg(&args).await {
        if let Err(remove_err) = store.remove(&slot.path).await {
            tracing::warn!(error = %remove_err, "Failed to remove partial output");
        }
        return Err(e);
    }

    Ok(ToolResult::single(ToolOutput::from(slot), plan.message))
}

fn seconds(value: f64) -> String {
    format!("{:.3}", value)
}
