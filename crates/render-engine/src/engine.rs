//! The transcoding engine seam.
//!
//! Every engine call is described by an [`EngineInvocation`] and only turned
//! into a command line inside [`TranscodeEngine::run`]. Tests substitute a
//! fake engine that inspects invocations instead of running ffmpeg.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_common::timecode::format_engine_secs;

use crate::locator::LocatedEngine;

/// Sample rate shared by every audio stream the pipeline produces.
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;

/// One input of an engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInput {
    /// A still image repeated as a video stream.
    StillImage { path: PathBuf, framerate: u32 },
    /// A media file read once.
    Media { path: PathBuf },
    /// A media file looped indefinitely.
    Looped { path: PathBuf },
    /// Generated stereo silence of a fixed length.
    Silence { duration_secs: f64 },
    /// A concat manifest listing files to join.
    ConcatList { path: PathBuf },
}

impl EngineInput {
    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            EngineInput::StillImage { path, framerate } => {
                push(args, ["-loop", "1", "-framerate"]);
                args.push(framerate.to_string());
                args.push("-i".to_string());
                args.push(path.to_string_lossy().into_owned());
            }
            EngineInput::Media { path } => {
                args.push("-i".to_string());
                args.push(path.to_string_lossy().into_owned());
            }
            EngineInput::Looped { path } => {
                push(args, ["-stream_loop", "-1", "-i"]);
                args.push(path.to_string_lossy().into_owned());
            }
            EngineInput::Silence { duration_secs } => {
                push(args, ["-f", "lavfi", "-t"]);
                args.push(format_engine_secs(*duration_secs));
                args.push("-i".to_string());
                args.push(format!(
                    "anullsrc=channel_layout=stereo:sample_rate={AUDIO_SAMPLE_RATE}"
                ));
            }
            EngineInput::ConcatList { path } => {
                push(args, ["-f", "concat", "-safe", "0", "-i"]);
                args.push(path.to_string_lossy().into_owned());
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            EngineInput::StillImage { path, .. }
            | EngineInput::Media { path }
            | EngineInput::Looped { path }
            | EngineInput::ConcatList { path } => Some(path),
            EngineInput::Silence { .. } => None,
        }
    }
}

/// How the invocation filters its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// A single-input chain applied with `-vf`.
    Video(String),
    /// A labelled graph applied with `-filter_complex`.
    Complex(String),
}

/// A structured description of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInvocation {
    /// Human-readable purpose, used in logs.
    pub label: String,
    pub inputs: Vec<EngineInput>,
    pub filter: Option<FilterSpec>,
    pub maps: Vec<String>,
    pub output_args: Vec<String>,
    pub output: PathBuf,
}

impl EngineInvocation {
    pub fn new(label: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            inputs: Vec::new(),
            filter: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.into(),
        }
    }

    pub fn input(mut self, input: EngineInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn video_filter(mut self, chain: impl Into<String>) -> Self {
        self.filter = Some(FilterSpec::Video(chain.into()));
        self
    }

    pub fn filter_complex(mut self, graph: impl Into<String>) -> Self {
        self.filter = Some(FilterSpec::Complex(graph.into()));
        self
    }

    pub fn map(mut self, stream: impl Into<String>) -> Self {
        self.maps.push(stream.into());
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Serialize to an ffmpeg argument vector (without the program name).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        push(&mut args, ["-hide_banner", "-loglevel", "error", "-y"]);

        for input in &self.inputs {
            input.push_args(&mut args);
        }

        match &self.filter {
            Some(FilterSpec::Video(chain)) => {
                args.push("-vf".to_string());
                args.push(chain.clone());
            }
            Some(FilterSpec::Complex(graph)) => {
                args.push("-filter_complex".to_string());
                args.push(graph.clone());
            }
            None => {}
        }

        for stream in &self.maps {
            args.push("-map".to_string());
            args.push(stream.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

fn push<const N: usize>(args: &mut Vec<String>, items: [&str; N]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

/// An external transcoding engine.
pub trait TranscodeEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Run one invocation to completion. A non-zero exit becomes
    /// [`StoryreelError::EngineFailure`] carrying the engine's stderr.
    fn run(&self, invocation: &EngineInvocation) -> StoryreelResult<()>;

    /// Duration of a media file in seconds, or `None` if it cannot be read.
    fn probe_duration(&self, media: &Path) -> Option<f64>;
}

/// ffmpeg / ffprobe on the local machine.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: Option<PathBuf>,
}

impl FfmpegEngine {
    pub fn new(located: LocatedEngine) -> Self {
        Self {
            ffmpeg: located.ffmpeg,
            ffprobe: located.ffprobe,
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe_path(&self) -> Option<&Path> {
        self.ffprobe.as_deref()
    }
}

impl TranscodeEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn run(&self, invocation: &EngineInvocation) -> StoryreelResult<()> {
        let args = invocation.to_args();
        tracing::debug!(label = %invocation.label, args = ?args, "Running ffmpeg");

        let started = std::time::Instant::now();
        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                StoryreelError::engine_failure(format!(
                    "failed to start {}: {e}",
                    self.ffmpeg.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", invocation.label, output.status)
            } else {
                stderr
            };
            return Err(StoryreelError::engine_failure(message));
        }

        tracing::debug!(
            label = %invocation.label,
            output = %invocation.output.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ffmpeg finished"
        );
        Ok(())
    }

    fn probe_duration(&self, media: &Path) -> Option<f64> {
        let ffprobe = self.ffprobe.as_ref()?;
        let output = Command::new(ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(media)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's bare duration output.
fn parse_probe_output(raw: &str) -> Option<f64> {
    let secs = raw.lines().next()?.trim().parse::<f64>().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Some(secs)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_style_invocation_args() {
        let invocation = EngineInvocation::new("scene 1", "/w/clip.mp4")
            .input(EngineInput::StillImage {
                path: PathBuf::from("/in/a.png"),
                framerate: 30,
            })
            .input(EngineInput::Silence { duration_secs: 5.0 })
            .video_filter("scale=960:540")
            .map("0:v")
            .map("1:a")
            .output_args(["-t", "5.000"]);

        let args = invocation.to_args();
        assert_eq!(
            args,
            vec![
                "-hide_banner", "-loglevel", "error", "-y",
                "-loop", "1", "-framerate", "30", "-i", "/in/a.png",
                "-f", "lavfi", "-t", "5.000", "-i",
                "anullsrc=channel_layout=stereo:sample_rate=44100",
                "-vf", "scale=960:540",
                "-map", "0:v", "-map", "1:a",
                "-t", "5.000",
                "/w/clip.mp4",
            ]
        );
    }

    #[test]
    fn test_concat_and_loop_inputs() {
        let args = EngineInvocation::new("mix", "/w/out.mp4")
            .input(EngineInput::ConcatList {
                path: PathBuf::from("/w/list.txt"),
            })
            .input(EngineInput::Looped {
                path: PathBuf::from("/m/song.mp3"),
            })
            .filter_complex("[1:a]volume=0.15[bg]")
            .to_args();
        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i /w/list.txt"));
        assert!(joined.contains("-stream_loop -1 -i /m/song.mp3"));
        assert!(joined.contains("-filter_complex [1:a]volume=0.15[bg]"));
        assert!(joined.ends_with("/w/out.mp4"));
    }

    #[test]
    fn test_parse_probe_output() {
        assert_eq!(parse_probe_output("7.250000\n"), Some(7.25));
        assert_eq!(parse_probe_output("N/A\n"), None);
        assert_eq!(parse_probe_output("0.000\n"), None);
        assert_eq!(parse_probe_output(""), None);
    }

    #[test]
    fn test_missing_binary_is_engine_failure() {
        let engine = FfmpegEngine {
            ffmpeg: PathBuf::from("/nonexistent/storyreel-ffmpeg"),
            ffprobe: None,
        };
        let err = engine
            .run(&EngineInvocation::new("probe", "/tmp/never.mp4"))
            .unwrap_err();
        assert!(matches!(err, StoryreelError::EngineFailure { .. }));
        assert_eq!(engine.probe_duration(Path::new("/tmp/x.mp3")), None);
    }
}
