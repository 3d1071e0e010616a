//! Frame geometry: output size per aspect/tier and the parameters derived
//! from it (caption font size, fade length, zoom ramp).
//!
//! Every `(AspectRatio, QualityTier)` pair has a defined output; there is no
//! error path.

use serde::{Deserialize, Serialize};
use storyreel_common::timecode::frame_count;
use storyreel_job_model::style::{AspectRatio, QualityTier};

/// Nominal fade-in / fade-out length.
pub const FADE_SECS: f64 = 0.6;

/// Zoom factor reached at the last frame of a scene.
pub const MAX_ZOOM: f64 = 1.06;

/// Caption font size as a fraction of frame height.
pub const FONT_HEIGHT_FRACTION: f64 = 0.06;

/// Smallest caption font size, in pixels.
pub const MIN_FONT_SIZE: u32 = 18;

/// Scene frame rate unless configured otherwise.
pub const DEFAULT_FPS: u32 = 30;

/// Resolved output geometry for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Caption font size in pixels.
    pub font_size: u32,
}

/// Slow-zoom parameters for one scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Frames the zoom ramp is spread over.
    pub frames: u32,
    /// Zoom increment per output frame.
    pub step: f64,
    /// Upper bound of the ramp.
    pub max_zoom: f64,
}

/// Target pixel dimensions for an aspect ratio and tier.
pub fn target_dimensions(aspect: AspectRatio, tier: QualityTier) -> (u32, u32) {
    match (aspect, tier) {
        (AspectRatio::Landscape, QualityTier::Final) => (1920, 1080),
        (AspectRatio::Portrait, QualityTier::Final) => (1080, 1920),
        (AspectRatio::Square, QualityTier::Final) => (1080, 1080),
        (AspectRatio::Landscape, QualityTier::Preview) => (960, 540),
        (AspectRatio::Portrait, QualityTier::Preview) => (540, 960),
        (AspectRatio::Square, QualityTier::Preview) => (540, 540),
    }
}

impl FrameGeometry {
    /// Resolve geometry at the default frame rate.
    pub fn resolve(aspect: AspectRatio, tier: QualityTier) -> Self {
        let (width, height) = target_dimensions(aspect, tier);
        let font_size = ((height as f64 * FONT_HEIGHT_FRACTION).round() as u32).max(MIN_FONT_SIZE);
        Self {
            width,
            height,
            fps: DEFAULT_FPS,
            font_size,
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Fade length for a scene: nominally [`FADE_SECS`], never more than
    /// half the scene.
    pub fn fade_secs(duration_secs: f64) -> f64 {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return 0.0;
        }
        FADE_SECS.min(duration_secs / 2.0)
    }

    /// Frames needed to cover the scene.
    pub fn frame_count(&self, duration_secs: f64) -> u32 {
        frame_count(duration_secs, self.fps)
    }

    /// Zoom ramp from 1.0 to [`MAX_ZOOM`] across the scene's frames.
    pub fn motion(&self, duration_secs: f64) -> MotionParams {
        let frames = self.frame_count(duration_secs);
        MotionParams {
            frames,
            step: (MAX_ZOOM - 1.0) / frames as f64,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(AspectRatio, QualityTier); 6] = [
        (AspectRatio::Landscape, QualityTier::Final),
        (AspectRatio::Portrait, QualityTier::Final),
        (AspectRatio::Square, QualityTier::Final),
        (AspectRatio::Landscape, QualityTier::Preview),
        (AspectRatio::Portrait, QualityTier::Preview),
        (AspectRatio::Square, QualityTier::Preview),
    ];

    #[test]
    fn test_all_combinations_defined_and_deterministic() {
        for (aspect, tier) in ALL {
            let a = FrameGeometry::resolve(aspect, tier);
            let b = FrameGeometry::resolve(aspect, tier);
            assert_eq!(a, b);
            assert!(a.width > 0 && a.height > 0);
            assert_eq!(a.width % 2, 0, "odd width breaks yuv420p");
            assert_eq!(a.height % 2, 0, "odd height breaks yuv420p");
        }
    }

    #[test]
    fn test_portrait_final_and_preview_share_ratio() {
        let full = FrameGeometry::resolve(AspectRatio::Portrait, QualityTier::Final);
        let preview = FrameGeometry::resolve(AspectRatio::Portrait, QualityTier::Preview);
        assert!(full.is_portrait());
        assert!(preview.is_portrait());
        assert!(preview.width < full.width && preview.height < full.height);
        let full_ratio = full.width as f64 / full.height as f64;
        let preview_ratio = preview.width as f64 / preview.height as f64;
        assert!((full_ratio - preview_ratio).abs() < 1e-9);
    }

    #[test]
    fn test_font_size_tracks_height() {
        let landscape = FrameGeometry::resolve(AspectRatio::Landscape, QualityTier::Final);
        let portrait = FrameGeometry::resolve(AspectRatio::Portrait, QualityTier::Final);
        assert_eq!(landscape.font_size, 65);
        assert!(portrait.font_size > landscape.font_size);
    }

    #[test]
    fn test_fade_never_exceeds_half_scene() {
        assert!((FrameGeometry::fade_secs(5.0) - FADE_SECS).abs() < 1e-9);
        let short = FrameGeometry::fade_secs(0.4);
        assert!(short < FADE_SECS);
        assert!(short <= 0.2 + 1e-9);
        assert_eq!(FrameGeometry::fade_secs(0.0), 0.0);
    }

    #[test]
    fn test_motion_ramp_reaches_max_on_last_frame() {
        let geometry = FrameGeometry::resolve(AspectRatio::Square, QualityTier::Final);
        let motion = geometry.motion(5.0);
        assert_eq!(motion.frames, 150);
        let reached = 1.0 + motion.step * motion.frames as f64;
        assert!((reached - MAX_ZOOM).abs() < 1e-9);
    }
}
