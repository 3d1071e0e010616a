//! Visual style selectors for a job.
//!
//! Every selector parses leniently: callers hand in whatever the user typed
//! and get a defined value back. Unknown input falls back to the documented
//! default rather than failing the job.

use serde::{Deserialize, Serialize};

/// Requested output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Parse `"16:9"`, `"9:16"`, or `"1:1"`. Anything else is 16:9.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "16:9" => AspectRatio::Landscape,
            "9:16" => AspectRatio::Portrait,
            "1:1" => AspectRatio::Square,
            other => {
                if !other.is_empty() {
                    tracing::warn!(value = %other, "Unknown aspect ratio, using 16:9");
                }
                AspectRatio::Landscape
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
        }
    }
}

/// Rendering quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Smaller frames, faster encoder settings, shorter default scenes.
    Preview,
    #[default]
    Final,
}

impl QualityTier {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "preview" | "draft" | "fast" => QualityTier::Preview,
            _ => QualityTier::Final,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Preview => "preview",
            QualityTier::Final => "final",
        }
    }
}

/// Colour-grade preset applied to every scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorGrade {
    #[default]
    None,
    Warm,
    Cool,
    Vivid,
    Mono,
    Cinematic,
    Vintage,
}

impl ColorGrade {
    /// Unknown preset names produce `None`, a no-op grade.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warm" => ColorGrade::Warm,
            "cool" | "cold" => ColorGrade::Cool,
            "vivid" | "vibrant" => ColorGrade::Vivid,
            "mono" | "bw" | "grayscale" | "greyscale" | "blackwhite" => ColorGrade::Mono,
            "cinematic" | "film" => ColorGrade::Cinematic,
            "vintage" | "retro" => ColorGrade::Vintage,
            _ => ColorGrade::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorGrade::None => "none",
            ColorGrade::Warm => "warm",
            ColorGrade::Cool => "cool",
            ColorGrade::Vivid => "vivid",
            ColorGrade::Mono => "mono",
            ColorGrade::Cinematic => "cinematic",
            ColorGrade::Vintage => "vintage",
        }
    }
}

/// How caption text appears over the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealEffect {
    /// One sweep filling the whole line across the scene.
    SmoothFill,
    /// Word-by-word highlight weighted by word length.
    #[default]
    PerWord,
    /// Character-by-character highlight, uniform timing.
    PerCharacter,
    /// Whole line fades in.
    FadeIn,
    /// Whole line scales up past full size and settles.
    Pop,
    /// Whole line shown for the full scene.
    Static,
}

impl RevealEffect {
    /// Unknown selectors show the caption statically.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "smooth-fill" | "smooth" | "fill" | "sweep" => RevealEffect::SmoothFill,
            "per-word" | "word" | "words" | "karaoke" => RevealEffect::PerWord,
            "per-character" | "per-char" | "char" | "character" | "typewriter" => {
                RevealEffect::PerCharacter
            }
            "fade-in" | "fade" => RevealEffect::FadeIn,
            "pop" | "bounce" => RevealEffect::Pop,
            "none" | "static" | "" => RevealEffect::Static,
            other => {
                tracing::warn!(value = %other, "Unknown reveal effect, showing captions statically");
                RevealEffect::Static
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RevealEffect::SmoothFill => "smooth-fill",
            RevealEffect::PerWord => "per-word",
            RevealEffect::PerCharacter => "per-character",
            RevealEffect::FadeIn => "fade-in",
            RevealEffect::Pop => "pop",
            RevealEffect::Static => "static",
        }
    }

    /// Whether this effect subdivides the line into timed units.
    pub fn is_progressive(self) -> bool {
        matches!(self, RevealEffect::PerWord | RevealEffect::PerCharacter)
    }
}

/// How captions are burned into the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionBackend {
    /// Generated subtitle document rendered by the engine's subtitle filter.
    #[default]
    Ass,
    /// Plain text overlay; reveal effects degrade to static.
    DrawText,
}

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const YELLOW: Rgb = Rgb::new(0xFF, 0xD7, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a palette name or a `#RRGGBB` / `RRGGBB` hex value.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        let named = match value.as_str() {
            "white" => Some(Rgb::WHITE),
            "yellow" => Some(Rgb::YELLOW),
            "red" => Some(Rgb::new(0xFF, 0x3B, 0x30)),
            "green" => Some(Rgb::new(0x34, 0xC7, 0x59)),
            "blue" => Some(Rgb::new(0x0A, 0x84, 0xFF)),
            "cyan" => Some(Rgb::new(0x00, 0xE5, 0xFF)),
            "magenta" => Some(Rgb::new(0xFF, 0x2D, 0xAA)),
            "orange" => Some(Rgb::new(0xFF, 0x95, 0x00)),
            "pink" => Some(Rgb::new(0xFF, 0x6E, 0xC7)),
            "black" => Some(Rgb::BLACK),
            _ => None,
        };
        if named.is_some() {
            return named;
        }

        let hex = value.strip_prefix('#').unwrap_or(&value);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// ASS colour literal, `&HAABBGGRR` with the given alpha (0 = opaque).
    pub fn to_ass(self, alpha: u8) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", alpha, self.b, self.g, self.r)
    }

    /// Engine colour literal, `0xRRGGBB`.
    pub fn to_engine_hex(self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The caption highlight colour requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColor(pub String);

impl Default for TextColor {
    fn default() -> Self {
        Self("yellow".to_string())
    }
}

impl TextColor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Resolve to a concrete colour, falling back to yellow.
    pub fn resolve(&self) -> Rgb {
        Rgb::parse(&self.0).unwrap_or_else(|| {
            tracing::warn!(value = %self.0, "Unknown text colour, using yellow");
            Rgb::YELLOW
        })
    }
}
