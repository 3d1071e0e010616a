//! Caption font resolution.
//!
//! A font selector is either a path to a font file or a family key
//! (`sans`, `serif`, `mono`). Keys expand to per-platform candidate files;
//! the first one present on disk wins.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "sans" | "sans-serif" | "default" => Some(FontFamily::Sans),
            "serif" => Some(FontFamily::Serif),
            "mono" | "monospace" => Some(FontFamily::Mono),
            _ => None,
        }
    }

    /// Candidate font files for the current platform, most preferred first.
    pub fn candidates(self) -> &'static [&'static str] {
        if cfg!(windows) {
            match self {
                FontFamily::Sans => &[
                    "C:/Windows/Fonts/arial.ttf",
                    "C:/Windows/Fonts/segoeui.ttf",
                    "C:/Windows/Fonts/tahoma.ttf",
                ],
                FontFamily::Serif => &["C:/Windows/Fonts/times.ttf", "C:/Windows/Fonts/georgia.ttf"],
                FontFamily::Mono => &["C:/Windows/Fonts/consola.ttf", "C:/Windows/Fonts/cour.ttf"],
            }
        } else if cfg!(target_os = "macos") {
            match self {
                FontFamily::Sans => &[
                    "/System/Library/Fonts/Supplemental/Arial.ttf",
                    "/Library/Fonts/Arial.ttf",
                    "/System/Library/Fonts/Helvetica.ttc",
                ],
                FontFamily::Serif => &[
                    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
                    "/System/Library/Fonts/Times.ttc",
                ],
                FontFamily::Mono => &[
                    "/System/Library/Fonts/Menlo.ttc",
                    "/System/Library/Fonts/Supplemental/Courier New.ttf",
                ],
            }
        } else {
            match self {
                FontFamily::Sans => &[
                    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/TTF/DejaVuSans.ttf",
                    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                ],
                FontFamily::Serif => &[
                    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
                    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
                ],
                FontFamily::Mono => &[
                    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
                    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
                ],
            }
        }
    }
}

/// Resolve a font selector to an existing font file.
///
/// `None` means no usable file was found; the renderer's default font
/// applies.
pub fn resolve_font(selector: Option<&str>) -> Option<PathBuf> {
    resolve_font_with(selector, |p| p.is_file())
}

/// [`resolve_font`] with an injectable existence check.
pub fn resolve_font_with(selector: Option<&str>, exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    let raw = selector.unwrap_or("sans");

    let family = match FontFamily::parse(raw) {
        Some(family) => family,
        None => {
            let path = PathBuf::from(raw.trim());
            if exists(path.as_path()) {
                return Some(path);
            }
            tracing::warn!(font = %raw, "Font file not found, using sans fallback");
            FontFamily::Sans
        }
    };

    let found = family
        .candidates()
        .iter()
        .map(PathBuf::from)
        .find(|candidate| exists(candidate.as_path()));
    if found.is_none() {
        tracing::warn!(family = ?family, "No font file found, captions use the renderer default");
    }
    found
}
