//! Storyreel Processing Core: scene timing and caption compilation
//!
//! Turns a scene's inputs into the numbers and documents the renderer needs:
//! - **Duration:** narration length when present, tier default otherwise
//! - **Geometry:** output size, caption font size, fade length, zoom ramp
//! - **Caption timing:** reveal units and centisecond allocation per effect
//! - **ASS:** a styled subtitle document encoding the reveal
//!
//! This crate is pure computation apart from the [`DurationProbe`] seam.
//! All inputs are data; all outputs are data.

pub mod ass;
pub mod caption_style;
pub mod caption_timing;
pub mod duration;
pub mod geometry;

pub use caption_style::CaptionStyle;
pub use caption_timing::{CaptionTrack, RevealUnit};
pub use duration::{resolve_duration, DurationDefaults, DurationProbe};
pub use geometry::{FrameGeometry, MotionParams};
