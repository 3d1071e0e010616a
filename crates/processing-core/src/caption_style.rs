//! Caption appearance derived from frame geometry and user choices.

use std::path::Path;

use serde::{Deserialize, Serialize};
use storyreel_job_model::style::Rgb;

use crate::geometry::FrameGeometry;

/// Font family used when no font file is resolved.
pub const FALLBACK_FONT_NAME: &str = "Arial";

/// Families whose names do not split cleanly on case changes.
const KNOWN_FAMILIES: &[(&str, &str)] = &[
    ("DejaVuSansMono", "DejaVu Sans Mono"),
    ("DejaVuSansCondensed", "DejaVu Sans Condensed"),
    ("DejaVuSans", "DejaVu Sans"),
    ("DejaVuSerif", "DejaVu Serif"),
];

/// Shadow alpha: half transparent.
const SHADOW_ALPHA: u8 = 0x80;

/// ASS numpad alignment: bottom centre.
const ALIGN_BOTTOM_CENTER: u8 = 2;

/// Styling for the single caption line of a scene.
///
/// Karaoke tags sweep from `base` to `highlight`, so `highlight` lands in
/// the ASS primary colour slot and `base` in the secondary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    pub font_name: String,
    pub font_size: u32,
    pub highlight: Rgb,
    pub base: Rgb,
    pub outline: Rgb,
    pub shadow: Rgb,
    pub outline_width: u32,
    pub shadow_depth: u32,
    pub margin_h: u32,
    pub margin_v: u32,
    pub alignment: u8,
}

impl CaptionStyle {
    pub fn new(geometry: &FrameGeometry, highlight: Rgb, font_file: Option<&Path>) -> Self {
        let font_name = font_file
            .and_then(font_name_hint)
            .unwrap_or_else(|| FALLBACK_FONT_NAME.to_string());

        Self {
            font_name,
            font_size: geometry.font_size,
            highlight,
            base: Rgb::WHITE,
            outline: Rgb::BLACK,
            shadow: Rgb::BLACK,
            outline_width: (geometry.font_size / 16).max(2),
            shadow_depth: (geometry.font_size / 32).max(1),
            margin_h: geometry.width / 20,
            margin_v: geometry.height * 8 / 100,
            alignment: ALIGN_BOTTOM_CENTER,
        }
    }

    pub fn primary_colour(&self) -> String {
        self.highlight.to_ass(0)
    }

    pub fn secondary_colour(&self) -> String {
        self.base.to_ass(0)
    }

    pub fn outline_colour(&self) -> String {
        self.outline.to_ass(0)
    }

    pub fn back_colour(&self) -> String {
        self.shadow.to_ass(SHADOW_ALPHA)
    }
}

/// Guess a font family name from a font file name.
///
/// Weight and style suffixes are dropped and CamelCase is split, so
/// `DejaVuSans-Bold.ttf` becomes `DejaVu Sans`.
pub fn font_name_hint(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let family = stem.split(['-', '_']).next().unwrap_or_default();
    if family.is_empty() {
        return None;
    }
    if let Some((_, known)) = KNOWN_FAMILIES.iter().find(|(packed, _)| *packed == family) {
        return Some((*known).to_string());
    }

    let mut name = String::with_capacity(family.len() + 4);
    let chars: Vec<char> = family.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // Break "nS" -> "n S" but keep acronyms like "PT" together.
            if prev.is_lowercase() || (prev.is_uppercase() && next_lower) {
                name.push(' ');
            }
        }
        name.push(c);
    }

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_job_model::style::{AspectRatio, QualityTier};

    #[test]
    fn test_font_name_hint() {
        let hint = |p: &str| font_name_hint(Path::new(p));
        assert_eq!(hint("/usr/share/fonts/DejaVuSans-Bold.ttf").as_deref(), Some("DejaVu Sans"));
        assert_eq!(hint("C:/Windows/Fonts/arial.ttf").as_deref(), Some("arial"));
        assert_eq!(hint("LiberationSerif_Regular.ttf").as_deref(), Some("Liberation Serif"));
        assert_eq!(hint("PTMono.ttf").as_deref(), Some("PT Mono"));
    }

    #[test]
    fn test_style_defaults_and_colour_slots() {
        let geometry = FrameGeometry::resolve(AspectRatio::Landscape, QualityTier::Final);
        let style = CaptionStyle::new(&geometry, Rgb::YELLOW, None);
        assert_eq!(style.font_name, FALLBACK_FONT_NAME);
        assert_eq!(style.font_size, geometry.font_size);
        assert_eq!(style.primary_colour(), "&H0000D7FF");
        assert_eq!(style.secondary_colour(), "&H00FFFFFF");
        assert_eq!(style.outline_colour(), "&H00000000");
        assert_eq!(style.back_colour(), "&H80000000");
        assert_eq!(style.alignment, 2);
    }
}
