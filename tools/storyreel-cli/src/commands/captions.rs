//! Print the caption document compiled for a line of text.

use storyreel_job_model::style::{AspectRatio, QualityTier, RevealEffect, Rgb};
use storyreel_processing_core::ass::render_document;
use storyreel_processing_core::{CaptionStyle, CaptionTrack, FrameGeometry};

pub fn run(
    text: String,
    duration: f64,
    effect: String,
    aspect: String,
    quality: String,
) -> anyhow::Result<()> {
    if !duration.is_finite() || duration <= 0.0 {
        anyhow::bail!("Duration must be a positive number of seconds, got {duration}");
    }

    let geometry = FrameGeometry::resolve(AspectRatio::parse(&aspect), QualityTier::parse(&quality));
    let track = CaptionTrack::compile(&text, duration, RevealEffect::parse(&effect));
    let style = CaptionStyle::new(&geometry, Rgb::YELLOW, None);

    print!("{}", render_document(&track, &style, geometry.width, geometry.height));
    Ok(())
}
