//! Per-scene rendering: caption preparation and the single engine call that
//! turns an image plus audio into a clip.

use std::path::{Path, PathBuf};

use storyreel_common::error::StoryreelResult;
use storyreel_common::timecode::format_engine_secs;
use storyreel_job_model::scene::Scene;
use storyreel_job_model::style::QualityTier;
use storyreel_processing_core::ass::render_document;
use storyreel_processing_core::{CaptionStyle, CaptionTrack, FrameGeometry};

use crate::engine::{EngineInput, EngineInvocation, TranscodeEngine, AUDIO_SAMPLE_RATE};
use crate::filter_chain::FilterChain;

/// A successfully encoded scene clip.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub index: usize,
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Codec settings per tier. Every clip shares stream parameters so the
/// concat step can copy streams.
pub fn encoding_args(tier: QualityTier) -> Vec<String> {
    let (preset, crf) = match tier {
        QualityTier::Preview => ("ultrafast", "28"),
        QualityTier::Final => ("medium", "20"),
    };
    [
        "-c:v",
        "libx264",
        "-preset",
        preset,
        "-crf",
        crf,
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-b:a",
        "192k",
        "-ac",
        "2",
        "-ar",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain([AUDIO_SAMPLE_RATE.to_string()])
    .collect()
}

/// ASS document for a scene's caption.
pub fn caption_document(scene: &Scene, geometry: &FrameGeometry, font_file: Option<&Path>) -> String {
    let track = CaptionTrack::compile(&scene.caption, scene.duration_secs, scene.effect);
    let style = CaptionStyle::new(geometry, scene.text_color, font_file);
    tracing::debug!(
        scene = scene.index,
        effect = scene.effect.as_str(),
        units = track.units.len(),
        total_centis = track.total_centis,
        "Compiled caption"
    );
    render_document(&track, &style, geometry.width, geometry.height)
}

/// The engine call for one scene.
///
/// Input 0 is the looped image, input 1 the narration or generated silence
/// of the same length, so every clip carries an audio stream.
pub fn scene_invocation(
    scene: &Scene,
    chain: &FilterChain,
    tier: QualityTier,
    fps: u32,
    output: &Path,
) -> EngineInvocation {
    let audio = match &scene.narration {
        Some(path) => EngineInput::Media { path: path.clone() },
        None => EngineInput::Silence {
            duration_secs: scene.duration_secs,
        },
    };

    EngineInvocation::new(format!("scene {}", scene.index), output)
        .input(EngineInput::StillImage {
            path: scene.image.clone(),
            framerate: fps,
        })
        .input(audio)
        .video_filter(chain.to_filter_string())
        .map("0:v")
        .map("1:a")
        .output_args(["-t".to_string(), format_engine_secs(scene.duration_secs)])
        .output_args(["-r".to_string(), fps.to_string()])
        .output_args(encoding_args(tier))
}

/// Render one scene to `output`.
pub fn render_scene<E: TranscodeEngine + ?Sized>(
    engine: &E,
    scene: &Scene,
    chain: &FilterChain,
    tier: QualityTier,
    fps: u32,
    output: &Path,
) -> StoryreelResult<RenderedClip> {
    tracing::info!(
        scene = scene.index,
        duration_secs = scene.duration_secs,
        narrated = scene.is_narrated(),
        size = %scene.frame_size(),
        "Rendering scene"
    );

    engine.run(&scene_invocation(scene, chain, tier, fps, output))?;

    Ok(RenderedClip {
        index: scene.index,
        path: output.to_path_buf(),
        duration_secs: scene.duration_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_chain::CaptionOverlay;
    use storyreel_job_model::style::{AspectRatio, ColorGrade, RevealEffect, Rgb};

    fn scene(narration: Option<PathBuf>) -> Scene {
        Scene {
            index: 2,
            image: PathBuf::from("/in/b.jpg"),
            caption: "Two words".to_string(),
            narration,
            duration_secs: 4.5,
            width: 1080,
            height: 1920,
            grade: ColorGrade::None,
            text_color: Rgb::YELLOW,
            effect: RevealEffect::PerWord,
        }
    }

    fn invocation_for(scene: &Scene) -> EngineInvocation {
        let geometry = FrameGeometry::resolve(AspectRatio::Portrait, QualityTier::Final);
        let chain = FilterChain::build(scene, &geometry, CaptionOverlay::None);
        scene_invocation(scene, &chain, QualityTier::Final, 30, Path::new("/w/s2.mp4"))
    }

    #[test]
    fn test_silent_scene_gets_generated_audio() {
        let invocation = invocation_for(&scene(None));
        assert_eq!(invocation.inputs[1], EngineInput::Silence { duration_secs: 4.5 });
        assert_eq!(invocation.maps, vec!["0:v", "1:a"]);
        let args = invocation.to_args().join(" ");
        assert!(args.contains("-t 4.500"));
        assert!(args.contains("-preset medium -crf 20 -pix_fmt yuv420p"));
        assert!(args.contains("-ac 2 -ar 44100"));
    }

    #[test]
    fn test_narrated_scene_uses_narration() {
        let invocation = invocation_for(&scene(Some(PathBuf::from("/w/n2.mp3"))));
        assert_eq!(
            invocation.inputs[1],
            EngineInput::Media {
                path: PathBuf::from("/w/n2.mp3")
            }
        );
    }

    #[test]
    fn test_preview_encoding() {
        let args = encoding_args(QualityTier::Preview).join(" ");
        assert!(args.contains("-preset ultrafast -crf 28"));
    }

    #[test]
    fn test_caption_document_uses_scene_geometry() {
        let geometry = FrameGeometry::resolve(AspectRatio::Portrait, QualityTier::Final);
        let doc = caption_document(&scene(None), &geometry, Some(Path::new("/f/DejaVuSans.ttf")));
        assert!(doc.contains("PlayResX: 1080"));
        assert!(doc.contains("Style: Caption,DejaVu Sans,"));
        assert!(doc.contains(",0:00:04.50,"));
    }
}
