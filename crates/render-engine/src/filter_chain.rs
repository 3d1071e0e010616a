//! Scene filter chains.
//!
//! A chain is a fixed sequence of [`FilterStage`]s: resize-pad, grade,
//! motion, caption, fade. Stages carry resolved numbers and are serialized
//! to engine syntax only by [`FilterChain::to_filter_string`].

use std::path::PathBuf;

use storyreel_common::timecode::format_engine_secs;
use storyreel_job_model::scene::Scene;
use storyreel_job_model::style::{ColorGrade, Rgb};
use storyreel_processing_core::geometry::FrameGeometry;

use crate::escape::{escape_filter_text, quote_filter_path};

/// Padding colour around letterboxed images.
pub const PAD_COLOR: &str = "black";

/// How the caption reaches the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionOverlay {
    /// Burn an ASS document with the `subtitles` filter.
    Subtitles {
        document: PathBuf,
        fonts_dir: Option<PathBuf>,
    },
    /// Static centred text in a translucent box.
    DrawText {
        text: String,
        font_file: Option<PathBuf>,
        font_size: u32,
        color: Rgb,
    },
    /// Nothing to draw.
    None,
}

/// One stage of a scene's filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    ResizePad { width: u32, height: u32 },
    Grade(ColorGrade),
    Motion {
        width: u32,
        height: u32,
        fps: u32,
        step: f64,
        max_zoom: f64,
    },
    Caption(CaptionOverlay),
    Fade { duration_secs: f64, fade_secs: f64 },
}

impl FilterStage {
    /// Engine syntax for this stage; `None` for no-op stages.
    pub fn render(&self) -> Option<String> {
        match self {
            FilterStage::ResizePad { width, height } => Some(format!(
                "scale={width}:{height}:force_original_aspect_ratio=decrease,\
                 pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color={PAD_COLOR},setsar=1"
            )),
            FilterStage::Grade(grade) => grade_filter(*grade).map(str::to_string),
            FilterStage::Motion {
                width,
                height,
                fps,
                step,
                max_zoom,
            } => Some(format!(
                "zoompan=z='min(1+{step:.6}*on,{max_zoom})':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=1:s={width}x{height}:fps={fps}"
            )),
            FilterStage::Caption(overlay) => caption_filter(overlay),
            FilterStage::Fade {
                duration_secs,
                fade_secs,
            } => {
                if *fade_secs <= 0.0 {
                    return None;
                }
                let out_start = (duration_secs - fade_secs).max(0.0);
                Some(format!(
                    "fade=t=in:st=0:d={fade},fade=t=out:st={out}:d={fade}",
                    fade = format_engine_secs(*fade_secs),
                    out = format_engine_secs(out_start),
                ))
            }
        }
    }
}

/// Fixed parameter bundle for each grade; `None` grades add nothing.
pub fn grade_filter(grade: ColorGrade) -> Option<&'static str> {
    match grade {
        ColorGrade::None => None,
        ColorGrade::Warm => Some("eq=contrast=1.05:saturation=1.15:gamma_r=1.08:gamma_b=0.92"),
        ColorGrade::Cool => Some("eq=contrast=1.05:saturation=1.05:gamma_r=0.92:gamma_b=1.08"),
        ColorGrade::Vivid => Some("eq=contrast=1.12:saturation=1.45"),
        ColorGrade::Mono => Some("hue=s=0"),
        ColorGrade::Cinematic => Some("eq=contrast=1.15:saturation=0.9:gamma=0.95,vignette=PI/5"),
        ColorGrade::Vintage => {
            Some("eq=contrast=0.95:saturation=0.7:gamma_r=1.1:gamma_b=0.85,vignette=PI/4")
        }
    }
}

fn caption_filter(overlay: &CaptionOverlay) -> Option<String> {
    match overlay {
        CaptionOverlay::Subtitles {
            document,
            fonts_dir,
        } => {
            let mut filter = format!("subtitles=filename={}", quote_filter_path(document));
            if let Some(dir) = fonts_dir {
                filter.push_str(&format!(":fontsdir={}", quote_filter_path(dir)));
            }
            Some(filter)
        }
        CaptionOverlay::DrawText {
            text,
            font_file,
            font_size,
            color,
        } => {
            if text.trim().is_empty() {
                return None;
            }
            let mut filter = String::from("drawtext=");
            if let Some(font) = font_file {
                filter.push_str(&format!("fontfile={}:", quote_filter_path(font)));
            }
            filter.push_str(&format!(
                "text='{}':fontcolor={}:fontsize={font_size}:\
                 x=(w-text_w)/2:y=(h-text_h)/2:box=1:boxcolor=black@0.5:boxborderw=12",
                escape_filter_text(text.trim()),
                color.to_engine_hex(),
            ));
            Some(filter)
        }
        CaptionOverlay::None => None,
    }
}

/// The ordered filter stages for one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Frame size comes from the scene; `geometry` supplies frame rate and
    /// motion timing.
    pub fn build(scene: &Scene, geometry: &FrameGeometry, caption: CaptionOverlay) -> Self {
        let motion = geometry.motion(scene.duration_secs);
        let stages = vec![
            FilterStage::ResizePad {
                width: scene.width,
                height: scene.height,
            },
            FilterStage::Grade(scene.grade),
            FilterStage::Motion {
                width: scene.width,
                height: scene.height,
                fps: geometry.fps,
                step: motion.step,
                max_zoom: motion.max_zoom,
            },
            FilterStage::Caption(caption),
            FilterStage::Fade {
                duration_secs: scene.duration_secs,
                fade_secs: FrameGeometry::fade_secs(scene.duration_secs),
            },
        ];
        Self { stages }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Comma-joined engine filter description.
    pub fn to_filter_string(&self) -> String {
        self.stages
            .iter()
            .filter_map(FilterStage::render)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use storyreel_job_model::style::{AspectRatio, QualityTier, RevealEffect};

    fn scene(duration_secs: f64, grade: ColorGrade) -> Scene {
        Scene {
            index: 1,
            image: PathBuf::from("/in/a.png"),
            caption: "Hello".to_string(),
            narration: None,
            duration_secs,
            width: 960,
            height: 540,
            grade,
            text_color: Rgb::YELLOW,
            effect: RevealEffect::PerWord,
        }
    }

    fn geometry() -> FrameGeometry {
        FrameGeometry::resolve(AspectRatio::Landscape, QualityTier::Preview)
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let chain = FilterChain::build(&scene(3.0, ColorGrade::Warm), &geometry(), CaptionOverlay::None);
        let kinds: Vec<&str> = chain
            .stages()
            .iter()
            .map(|s| match s {
                FilterStage::ResizePad { .. } => "resize",
                FilterStage::Grade(_) => "grade",
                FilterStage::Motion { .. } => "motion",
                FilterStage::Caption(_) => "caption",
                FilterStage::Fade { .. } => "fade",
            })
            .collect();
        assert_eq!(kinds, vec!["resize", "grade", "motion", "caption", "fade"]);
    }

    #[test]
    fn test_filter_string_for_plain_scene() {
        let chain = FilterChain::build(&scene(3.0, ColorGrade::None), &geometry(), CaptionOverlay::None);
        let filter = chain.to_filter_string();
        assert!(filter.starts_with(
            "scale=960:540:force_original_aspect_ratio=decrease,pad=960:540:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,zoompan="
        ));
        assert!(filter.contains("min(1+0.000667*on,1.06)"));
        assert!(filter.contains(":s=960x540:fps=30"));
        assert!(filter.ends_with("fade=t=in:st=0:d=0.600,fade=t=out:st=2.400:d=0.600"));
        assert!(!filter.contains(",,"));
    }

    #[test]
    fn test_frame_size_follows_scene() {
        let mut portrait = scene(3.0, ColorGrade::None);
        portrait.width = 540;
        portrait.height = 960;
        let filter =
            FilterChain::build(&portrait, &geometry(), CaptionOverlay::None).to_filter_string();
        assert!(filter.starts_with("scale=540:960:force_original_aspect_ratio=decrease,pad=540:960:"));
        assert!(filter.contains(":s=540x960:fps=30"));
    }

    #[test]
    fn test_short_scene_fades_fit() {
        let stage = FilterStage::Fade {
            duration_secs: 0.4,
            fade_secs: FrameGeometry::fade_secs(0.4),
        };
        assert_eq!(
            stage.render().as_deref(),
            Some("fade=t=in:st=0:d=0.200,fade=t=out:st=0.200:d=0.200")
        );
    }

    #[test]
    fn test_grades() {
        assert_eq!(grade_filter(ColorGrade::None), None);
        assert_eq!(grade_filter(ColorGrade::Mono), Some("hue=s=0"));
        assert!(grade_filter(ColorGrade::Cinematic).unwrap().contains("vignette"));
    }

    #[test]
    fn test_subtitles_overlay_quotes_paths() {
        let overlay = CaptionOverlay::Subtitles {
            document: PathBuf::from(r"C:\work\scene 1.ass"),
            fonts_dir: Some(PathBuf::from("/usr/share/fonts/truetype/dejavu")),
        };
        assert_eq!(
            caption_filter(&overlay).unwrap(),
            r"subtitles=filename='C\:/work/scene 1.ass':fontsdir='/usr/share/fonts/truetype/dejavu'"
        );
    }

    #[test]
    fn test_drawtext_overlay_escapes_text() {
        let overlay = CaptionOverlay::DrawText {
            text: "Rock 'n' roll: 100%".to_string(),
            font_file: Some(Path::new("/f/DejaVuSans.ttf").to_path_buf()),
            font_size: 40,
            color: Rgb::WHITE,
        };
        let filter = caption_filter(&overlay).unwrap();
        assert!(filter.starts_with("drawtext=fontfile='/f/DejaVuSans.ttf':"));
        assert!(filter.contains(r"text='Rock \'n\' roll\: 100\%'"));
        assert!(filter.contains("fontcolor=0xFFFFFF"));
        assert!(filter.contains("x=(w-text_w)/2:y=(h-text_h)/2:box=1:boxcolor=black@0.5"));
    }
}
