//! A scene: one image, its caption, and the attributes resolved for rendering.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::style::{ColorGrade, RevealEffect, Rgb};

/// One image plus caption, fully resolved and ready to render.
///
/// Built by the orchestrator once duration and geometry are known; consumed
/// exactly once by the scene renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based position in the job.
    pub index: usize,

    /// Source still image.
    pub image: PathBuf,

    /// Caption text (never empty after script reconciliation).
    pub caption: String,

    /// Synthesized narration for this scene, if narration is on.
    pub narration: Option<PathBuf>,

    /// Playback length in seconds (> 0).
    pub duration_secs: f64,

    /// Target frame size in pixels.
    pub width: u32,
    pub height: u32,

    /// Colour grade preset.
    pub grade: ColorGrade,

    /// Caption highlight colour.
    pub text_color: Rgb,

    /// Caption reveal effect.
    pub effect: RevealEffect,
}

impl Scene {
    /// Whether this scene carries a real narration track.
    pub fn is_narrated(&self) -> bool {
        self.narration.is_some()
    }

    /// Frame size as `WxH`.
    pub fn frame_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
