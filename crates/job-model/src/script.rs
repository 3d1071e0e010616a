//! Caption script parsing and reconciliation with the image list.
//!
//! A script is newline-separated text, one caption per image, blank lines
//! ignored. Images and captions must reach equal length before rendering;
//! [`ScriptPolicy`] decides how a mismatch is handled.

use std::path::Path;

use serde::{Deserialize, Serialize};
use storyreel_common::error::{StoryreelError, StoryreelResult};

/// What to do when caption and image counts disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptPolicy {
    /// Synthesize captions from filenames for a blank script, pad missing
    /// captions with placeholders, and drop extra captions.
    #[default]
    Reconcile,
    /// Reject a blank script or any count mismatch.
    Strict,
}

/// Split a script into caption lines, trimming each and skipping blanks.
pub fn parse_script(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derive a caption from an image filename: the file stem with underscores
/// turned into spaces.
pub fn caption_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let caption = stem
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if caption.is_empty() {
        None
    } else {
        Some(caption)
    }
}

/// Caption used when a scene has nothing better. `index` is zero-based.
pub fn placeholder_caption(index: usize) -> String {
    format!("Scene {}", index + 1)
}

/// Produce exactly one caption per image according to `policy`.
pub fn resolve_captions<P: AsRef<Path>>(
    images: &[P],
    script: Option<&str>,
    policy: ScriptPolicy,
) -> StoryreelResult<Vec<String>> {
    let lines = script.map(parse_script).unwrap_or_default();

    match policy {
        ScriptPolicy::Strict => {
            if lines.is_empty() {
                return Err(StoryreelError::input_contract("script is empty"));
            }
            if lines.len() != images.len() {
                return Err(StoryreelError::input_contract(format!(
                    "script has {} lines but {} images were supplied",
                    lines.len(),
                    images.len()
                )));
            }
            Ok(lines)
        }
        ScriptPolicy::Reconcile => {
            if lines.is_empty() {
                tracing::info!(
                    images = images.len(),
                    "No script supplied, deriving captions from filenames"
                );
                return Ok(images
                    .iter()
                    .enumerate()
                    .map(|(i, image)| {
                        caption_from_filename(image.as_ref())
                            .unwrap_or_else(|| placeholder_caption(i))
                    })
                    .collect());
            }

            if lines.len() != images.len() {
                tracing::warn!(
                    lines = lines.len(),
                    images = images.len(),
                    "Caption count does not match image count, reconciling"
                );
            }

            let mut captions = lines;
            captions.truncate(images.len());
            while captions.len() < images.len() {
                captions.push(placeholder_caption(captions.len()));
            }
            Ok(captions)
        }
    }
}
