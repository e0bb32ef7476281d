use super::{execute, input_extension, seconds, MediaPlan, MediaRunner};
use crate::error::{ProcessingError, ProcessingResult};
use crate::job::{ToolJob, ToolResult};
use crate::registry::ToolHandler;
use async_trait::async_trait;
use filekit_core::catalog::VIDEO_INPUT;
use filekit_core::Category;
use filekit_storage::TempStore;

pub const TOOL_IDS: &[&str] = &[
    "audio-extractor",
    "video-converter",
    "video-compress",
    "video-trim",
    "video-mute",
    "gif-creator",
];

const OUTPUT_FORMATS: &[&str] = &["mp4", "avi", "mov", "webm", "gif"];
const MAX_SECONDS: f64 = 24.0 * 3600.0;

fn bitrate_for(quality: &str) -> &'static str {
    match quality {
        "high" => "2000k",
        "low" => "500k",
        _ => "1000k",
    }
}

pub struct VideoToolHandler {
    store: TempStore,
    runner: MediaRunner,
}

impl VideoToolHandler {
    pub fn new(store: TempStore, runner: MediaRunner) -> Self {
        Self { store, runner }
    }
}

#[async_trait]
impl ToolHandler for VideoToolHandler {
    fn category(&self) -> Category {
        Category::Video
    }

    fn tool_ids(&self) -> &'static [&'static str] {
        TOOL_IDS
    }

    async fn run(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        execute(&self.store, &self.runner, plan(job)?).await
    }
}

pub fn plan(job: &ToolJob) -> ProcessingResult<MediaPlan> {
    let input = job.primary();
    let params = &job.params;
    let stem = input.stem();
    let same_ext = input_extension(input, VIDEO_INPUT, "mp4");
    let mut args = MediaPlan::reading(&[input]);

    let (display_name, message) = match job.tool_id() {
        "audio-extractor" => {
            args.extend(["-vn", "-acodec", "libmp3lame", "-q:a", "2"].map(String::from));
            (format!("{}.mp3", stem), "Audio extracted".to_string())
        }
        "video-converter" => {
            let format = params.choice("output_format", OUTPUT_FORMATS, "mp4");
            let quality = params.choice("quality", &["high", "medium", "low"], "medium");
            let bitrate = bitrate_for(quality);
            match format {
                "gif" => args.extend(["-vf", "fps=10,scale=480:-1:flags=lanczos", "-an"].map(String::from)),
                "webm" => args.extend(
                    ["-c:v", "libvpx-vp9", "-b:v", bitrate, "-c:a", "libopus"].map(String::from),
                ),
                _ => args.extend(["-c:v", "libx264", "-b:v", bitrate, "-c:a", "aac"].map(String::from)),
            }
            (
                format!("converted_{}.{}", stem, format),
                format!("Converted to {} ({} quality)", format.to_uppercase(), quality),
            )
        }
        "video-compress" => {
            let scale = params.float("scale", 0.5, 0.1, 1.0);
            args.extend([
                "-vf".to_string(),
                format!("scale=trunc(iw*{s}/2)*2:trunc(ih*{s}/2)*2", s = scale),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-b:v".to_string(),
                "800k".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                "128k".to_string(),
            ]);
            (format!("compressed_{}.mp4", stem), "Video compressed".to_string())
        }
        "video-trim" => {
            let start = params.float("start", 0.0, 0.0, MAX_SECONDS);
            let end = params.opt_float("end", 0.0, MAX_SECONDS);
            args.extend(["-ss".to_string(), seconds(start)]);
            if let Some(end) = end {
                if end <= start {
                    return Err(ProcessingError::InvalidInput(
                        "End time must be after start time".to_string(),
                    ));
                }
                args.extend(["-to".to_string(), seconds(end)]);
            }
            args.extend(["-c", "copy"].map(String::from));
            (format!("trimmed_{}.{}", stem, same_ext), "Video trimmed".to_string())
        }
        "video-mute" => {
            args.extend(["-c:v", "copy", "-an"].map(String::from));
            (format!("muted_{}.{}", stem, same_ext), "Audio removed".to_string())
        }
        "gif-creator" => {
            let fps = params.int("fps", 10, 1, 30);
            if let Some(duration) = params.opt_float("duration", 0.1, 60.0) {
                args.extend(["-t".to_string(), seconds(duration)]);
            }
            args.extend([
                "-vf".to_string(),
                format!("fps={},scale=iw/2:-1:flags=lanczos", fps),
                "-an".to_string(),
            ]);
            (format!("{}.gif", stem), format!("GIF created at {} fps", fps))
        }
        other => return Err(ProcessingError::UnknownTool(other.to_string())),
    };

    Ok(MediaPlan {
        args,
        display_name,
        message,
    })
}
