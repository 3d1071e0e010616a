//! Job request, configuration, progress, and result types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::script::ScriptPolicy;
use crate::style::{AspectRatio, CaptionBackend, ColorGrade, QualityTier, RevealEffect, TextColor};

/// Narration settings. Present means narration is on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationSettings {
    /// Voice identifier; `None` uses the configured default voice.
    #[serde(default)]
    pub voice: Option<String>,
}

/// Per-job rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Synthesize narration from each caption.
    pub narration: Option<NarrationSettings>,

    /// Output aspect ratio.
    pub aspect: AspectRatio,

    /// Preview or final quality.
    pub tier: QualityTier,

    /// Colour-grade preset.
    pub grade: ColorGrade,

    /// Caption highlight colour (palette name or hex).
    pub text_color: TextColor,

    /// Font selector: a font file path or a family key (`sans`, `serif`, `mono`).
    pub font: Option<String>,

    /// Caption reveal effect.
    pub effect: RevealEffect,

    /// Caption rendering backend.
    pub caption_backend: CaptionBackend,

    /// Background-music track, looped under the whole video.
    pub music: Option<PathBuf>,

    /// Caption/image count mismatch handling.
    pub script_policy: ScriptPolicy,
}

/// Everything needed to run one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Ordered still images.
    pub images: Vec<PathBuf>,

    /// Caption script, one line per image. `None` or blank means "derive".
    #[serde(default)]
    pub script: Option<String>,

    /// Rendering configuration.
    #[serde(default)]
    pub config: JobConfig,
}

impl JobRequest {
    pub fn new(images: Vec<PathBuf>, script: Option<String>) -> Self {
        Self {
            images,
            script,
            config: JobConfig::default(),
        }
    }

    pub fn with_config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    pub fn narration_enabled(&self) -> bool {
        self.config.narration.is_some()
    }
}

/// The sole externally visible result of a successful job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalArtifact {
    /// Unique job identifier.
    pub job_id: String,

    /// Concatenated (and possibly music-mixed) output file.
    pub path: PathBuf,

    /// Number of scenes rendered.
    pub scene_count: usize,

    /// Sum of scene durations in seconds.
    pub duration_secs: f64,

    /// Whether background music made it into the output.
    pub music_mixed: bool,

    /// Completion timestamp (RFC 3339).
    pub created_at: String,
}

impl FinalArtifact {
    pub fn new(job_id: impl Into<String>, path: PathBuf, scene_count: usize, duration_secs: f64) -> Self {
        Self {
            job_id: job_id.into(),
            path,
            scene_count,
            duration_secs,
            music_mixed: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Validate,
    ResolveScript,
    RenderScene,
    Concatenate,
    MixMusic,
    Done,
    Failed,
}

/// Progress report delivered at every stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub stage: JobStage,
    /// Scenes rendered so far.
    pub scenes_done: usize,
    /// Scenes in the job (0 until the script is resolved).
    pub total_scenes: usize,
}

impl JobProgress {
    /// Completion fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        match self.stage {
            JobStage::Done => 1.0,
            _ if self.total_scenes == 0 => 0.0,
            _ => (self.scenes_done as f64 / self.total_scenes as f64).clamp(0.0, 1.0),
        }
    }
}
