use super::{execute, input_extension, seconds, MediaPlan, MediaRunner};
use crate::error::{ProcessingError, ProcessingResult};
use crate::job::{ToolJob, ToolResult};
use crate::registry::ToolHandler;
use async_trait::async_trait;
use filekit_core::Category;
use filekit_storage::TempStore;

pub const TOOL_IDS: &[&str] = &[
    "audio-converter",
    "audio-speed",
    "audio-volume",
    "audio-trim",
    "audio-normalize",
    "audio-fade",
    "audio-merger",
];

const OUTPUT_FORMATS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac"];
const MAX_SECONDS: f64 = 24.0 * 3600.0;

/// Encoder and container for an output format.
fn codec_for(format: &str) -> (&'static str, &'static str) {
    match format {
        "aac" => ("aac", "adts"),
        "wav" => ("pcm_s16le", "wav"),
        "ogg" => ("libvorbis", "ogg"),
        "flac" => ("flac", "flac"),
        _ => ("libmp3lame", "mp3"),
    }
}

pub struct AudioToolHandler {
    store: TempStore,
    runner: MediaRunner,
}

impl AudioToolHandler {
    pub fn new(store: TempStore, runner: MediaRunner) -> Self {
        Self { store, runner }
    }
}

#[async_trait]
impl ToolHandler for AudioToolHandler {
    fn category(&self) -> Category {
        Category::Audio
    }

    fn tool_ids(&self) -> &'static [&'static str] {
        TOOL_IDS
    }

    async fn run(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        let duration = if job.tool_id() == "audio-fade" && fade_seconds(job).1 > 0.0 {
            Some(self.runner.duration(&job.primary().path).await?)
        } else {
            None
        };

        let plan = plan(job, duration)?;
        execute(&self.store, &self.runner, plan).await
    }
}

fn fade_seconds(job: &ToolJob) -> (f64, f64) {
    (
        job.params.float("fade_in", 2.0, 0.0, 30.0),
        job.params.float("fade_out", 2.0, 0.0, 30.0),
    )
}

/// Build the FFmpeg invocation for an audio tool. `duration` is only
/// needed for a fade-out.
pub fn plan(job: &ToolJob, duration: Option<f64>) -> ProcessingResult<MediaPlan> {
    let input = job.primary();
    let params = &job.params;
    let stem = input.stem();
    let same_ext = input_extension(input, OUTPUT_FORMATS, "mp3");
    let mut args = MediaPlan::reading(&[input]);

    let (display_name, message) = match job.tool_id() {
        "audio-converter" => {
            let format = params.choice("output_format", OUTPUT_FORMATS, "mp3");
            let (codec, container) = codec_for(format);
            args.extend(["-vn", "-acodec", codec, "-f", container].map(String::from));
            if format == "mp3" {
                args.extend(["-q:a", "2"].map(String::from));
            }
            (
                format!("converted_{}.{}", stem, format),
                format!("Converted to {}", format.to_uppercase()),
            )
        }
        "audio-speed" => {
            let speed = params.float("speed_factor", 1.0, 0.5, 2.0);
            args.extend(["-filter:a".to_string(), format!("atempo={}", speed), "-vn".to_string()]);
            (format!("speed_{}.{}", stem, same_ext), format!("Speed changed to {}x", speed))
        }
        "audio-volume" => {
            let db = params.float("volume_db", 6.0, -30.0, 30.0);
            args.extend(["-filter:a".to_string(), format!("volume={}dB", db), "-vn".to_string()]);
            (format!("volume_{}.{}", stem, same_ext), format!("Volume changed by {} dB", db))
        }
        "audio-trim" => {
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
            args.push("-vn".to_string());
            (format!("trimmed_{}.{}", stem, same_ext), "Audio trimmed".to_string())
        }
        "audio-normalize" => {
            args.extend(["-af", "loudnorm=I=-16:TP=-1.5:LRA=11", "-vn"].map(String::from));
            (format!("normalized_{}.{}", stem, same_ext), "Audio normalized".to_string())
        }
        "audio-fade" => {
            let (fade_in, fade_out) = fade_seconds(job);
            let mut filters = Vec::new();
            if fade_in > 0.0 {
                filters.push(format!("afade=t=in:st=0:d={}", fade_in));
            }
            if fade_out > 0.0 {
                let total = duration.ok_or_else(|| {
                    ProcessingError::Failed("fade-out needs the input duration".to_string())
                })?;
                let start = (total - fade_out).max(0.0);
                filters.push(format!("afade=t=out:st={}:d={}", seconds(start), fade_out));
            }
            if filters.is_empty() {
                return Err(ProcessingError::InvalidInput(
                    "Set a fade in or fade out duration".to_string(),
                ));
            }
            args.extend(["-af".to_string(), filters.join(","), "-vn".to_string()]);
            (format!("faded_{}.{}", stem, same_ext), "Fades applied".to_string())
        }
        "audio-merger" => {
            let inputs: Vec<_> = job.inputs.iter().collect();
            args = MediaPlan::reading(&inputs);
            let streams: String = (0..inputs.len()).map(|i| format!("[{}:a]", i)).collect();
            args.extend([
                "-filter_complex".to_string(),
                format!("{}concat=n={}:v=0:a=1[out]", streams, inputs.len()),
                "-map".to_string(),
                "[out]".to_string(),
                "-acodec".to_string(),
                "libmp3lame".to_string(),
                "-q:a".to_string(),
                "2".to_string(),
            ]);
            ("merged_audio.mp3".to_string(), format!("Merged {} audio files", inputs.len()))
        }
        other => return Err(ProcessingError::UnknownTool(other.to_string())),
    };

    Ok(MediaPlan {
        args,
        display_name,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::InputFile;
    use crate::params::ToolParams;
    use filekit_core::find_tool;
    use std::path::PathBuf;

    fn input(name: &str) -> InputFile {
        InputFile {
            path: PathBuf::from(format!("/tmp/in/{}", name)),
            original_name: name.to_string(),
        }
    }

    fn job(tool_id: &str, names: &[&str], params: ToolParams) -> ToolJob {
        ToolJob::new(find_tool(tool_id).unwrap(), names.iter().map(|n| input(n)).collect(), params)
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_converter_uses_codec_table() {
        let plan = plan(&job("audio-converter", &["song.wav"], ToolParams::from([("output_format", "OGG")])), None).unwrap();
        assert!(has_pair(&plan.args, "-acodec", "libvorbis"));
        assert_eq!(plan.display_name, "converted_song.ogg");
    }

    #[test]
    fn test_speed_is_clamped() {
        let plan = plan(&job("audio-speed", &["song.mp3"], ToolParams::from([("speed_factor", "10")])), None).unwrap();
        assert!(has_pair(&plan.args, "-filter:a", "atempo=2"));
        assert_eq!(plan.display_name, "speed_song.mp3");
    }

    #[test]
    fn test_volume_in_decibels() {
        let plan = plan(&job("audio-volume", &["song.flac"], ToolParams::from([("volume_db", "-3.5")])), None).unwrap();
        assert!(has_pair(&plan.args, "-filter:a", "volume=-3.5dB"));
        assert_eq!(plan.display_name, "volume_song.flac");
    }

    #[test]
    fn test_trim_rejects_reversed_range() {
        let err = plan(
            &job("audio-trim", &["song.mp3"], ToolParams::from([("start", "30"), ("end", "10")])),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));

        let ok = plan(&job("audio-trim", &["song.mp3"], ToolParams::from([("start", "5"), ("end", "10")])), None).unwrap();
        assert!(has_pair(&ok.args, "-ss", "5.000"));
        assert!(has_pair(&ok.args, "-to", "10.000"));
    }

    #[test]
    fn test_fade_out_starts_before_end() {
        let plan = plan(
            &job("audio-fade", &["song.mp3"], ToolParams::from([("fade_in", "0"), ("fade_out", "3")])),
            Some(60.0),
        )
        .unwrap();
        assert!(has_pair(&plan.args, "-af", "afade=t=out:st=57.000:d=3"));
    }

    #[test]
    fn test_merger_concatenates_in_order() {
        let plan = plan(&job("audio-merger", &["a.mp3", "b.wav", "c.ogg"], ToolParams::default()), None).unwrap();
        let inputs: Vec<&String> = plan.args.windows(2).filter(|w| w[0] == "-i").map(|w| &w[1]).collect();
        assert_eq!(inputs, vec!["/tmp/in/a.mp3", "/tmp/in/b.wav", "/tmp/in/c.ogg"]);
        assert!(has_pair(&plan.args, "-filter_complex", "[0:a][1:a][2:a]concat=n=3:v=0:a=1[out]"));
    }

    #[test]
    fn test_normalize_uses_loudnorm() {
        let plan = plan(&job("audio-normalize", &["talk.m4a"], ToolParams::default()), None).unwrap();
        assert!(has_pair(&plan.args, "-af", "loudnorm=I=-16:TP=-1.5:LRA=11"));
        // m4a is not a writable output format here
        assert_eq!(plan.display_name, "normalized_talk.mp3");
    }
}
