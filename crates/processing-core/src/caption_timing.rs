//! Caption reveal timing.
//!
//! A caption is one line of text shown for the whole scene. The reveal
//! effect decides how that line is cut into [`RevealUnit`]s and how the
//! scene's centiseconds are spread across them. Progressive effects
//! (per-word, per-character) always account for the full scene length so the
//! last unit lands on the scene's final frame.

use serde::{Deserialize, Serialize};
use storyreel_common::timecode::{format_ass_time, secs_to_centis};
use storyreel_job_model::style::RevealEffect;

/// Fade-in effect ramp, milliseconds.
pub const FADE_IN_MS: u32 = 700;

/// Pop effect overshoot scale, percent.
pub const POP_PEAK_PERCENT: u32 = 130;

/// Pop effect: time to reach the overshoot, milliseconds.
pub const POP_GROW_MS: u32 = 300;

/// Pop effect: time to settle back to full size, milliseconds.
pub const POP_SETTLE_MS: u32 = 600;

/// One timed piece of caption text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealUnit {
    pub text: String,
    /// Time the unit takes to reveal, in centiseconds.
    pub centis: u32,
}

impl RevealUnit {
    fn new(text: impl Into<String>, centis: u32) -> Self {
        Self {
            text: text.into(),
            centis,
        }
    }
}

/// A compiled caption: the units to reveal and the event they live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub effect: RevealEffect,
    pub units: Vec<RevealUnit>,
    /// Scene length in centiseconds, never zero.
    pub total_centis: u32,
    /// Event start, seconds from scene start.
    pub start_secs: f64,
    /// Event end, seconds from scene start.
    pub end_secs: f64,
}

/// Scene length in whole centiseconds, at least one.
pub fn total_centis(duration_secs: f64) -> u32 {
    secs_to_centis(duration_secs).max(1)
}

/// Spread `total` centiseconds over words in proportion to their length.
///
/// Every word gets at least one centisecond. Rounding drift goes to the last
/// word; if the minimums overshoot the budget, the excess is taken back from
/// the latest words first without pushing any below one.
pub fn allocate_per_word(words: &[&str], total: u32) -> Vec<u32> {
    if words.is_empty() {
        return Vec::new();
    }

    let lengths: Vec<u64> = words
        .iter()
        .map(|w| w.chars().count().max(1) as u64)
        .collect();
    let total_len: u64 = lengths.iter().sum();

    let mut alloc: Vec<u32> = lengths
        .iter()
        .map(|len| ((total as u64 * len) / total_len).max(1) as u32)
        .collect();

    let assigned: i64 = alloc.iter().map(|&c| c as i64).sum();
    let drift = total as i64 - assigned;

    if drift > 0 {
        if let Some(last) = alloc.last_mut() {
            *last += drift as u32;
        }
    } else if drift < 0 {
        let mut excess = -drift;
        for slot in alloc.iter_mut().rev() {
            if excess == 0 {
                break;
            }
            let spare = (*slot as i64 - 1).min(excess);
            *slot -= spare as u32;
            excess -= spare;
        }
    }

    alloc
}

/// Uniform per-character time: `max(1, total / count)`.
pub fn allocate_per_character(count: usize, total: u32) -> u32 {
    if count == 0 {
        return total.max(1);
    }
    (total / count as u32).max(1)
}

impl CaptionTrack {
    /// Compile `text` into timed units for a scene of `duration_secs`.
    pub fn compile(text: &str, duration_secs: f64, effect: RevealEffect) -> Self {
        let total = total_centis(duration_secs);
        let trimmed = text.trim();

        let units = if trimmed.is_empty() {
            vec![RevealUnit::new("", total)]
        } else {
            match effect {
                RevealEffect::PerWord => {
                    let words: Vec<&str> = trimmed.split_whitespace().collect();
                    allocate_per_word(&words, total)
                        .into_iter()
                        .zip(words)
                        .map(|(centis, word)| RevealUnit::new(word, centis))
                        .collect()
                }
                RevealEffect::PerCharacter => {
                    let chars: Vec<char> = trimmed.chars().collect();
                    let each = allocate_per_character(chars.len(), total);
                    chars
                        .into_iter()
                        .map(|c| RevealUnit::new(c.to_string(), each))
                        .collect()
                }
                RevealEffect::SmoothFill
                | RevealEffect::FadeIn
                | RevealEffect::Pop
                | RevealEffect::Static => vec![RevealUnit::new(trimmed, total)],
            }
        };

        let end_secs = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };

        Self {
            effect,
            units,
            total_centis: total,
            start_secs: 0.0,
            end_secs,
        }
    }

    /// Sum of all unit timings.
    pub fn allocated_centis(&self) -> u32 {
        self.units.iter().map(|u| u.centis).sum()
    }

    /// Text placed between consecutive units when rendering.
    pub fn separator(&self) -> &'static str {
        match self.effect {
            RevealEffect::PerWord => " ",
            _ => "",
        }
    }

    /// The caption line as displayed, without timing.
    pub fn plain_text(&self) -> String {
        self.units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    pub fn is_empty(&self) -> bool {
        self.units.iter().all(|u| u.text.is_empty())
    }

    pub fn start_timestamp(&self) -> String {
        format_ass_time(secs_to_centis(self.start_secs))
    }

    /// Event end, clamped so it never extends past the scene.
    pub fn end_timestamp(&self) -> String {
        format_ass_time(secs_to_centis(self.end_secs).max(secs_to_centis(self.start_secs)))
    }

    /// Fade-in ramp in milliseconds, shortened for very short scenes.
    pub fn fade_in_ms(&self) -> u32 {
        FADE_IN_MS.min(self.total_centis * 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_per_word_weights_by_length() {
        let track = CaptionTrack::compile("Hi everyone", 2.6, RevealEffect::PerWord);
        assert_eq!(track.total_centis, 260);
        assert_eq!(track.units.len(), 2);
        // 2 and 8 characters of 10.
        assert_eq!(track.units[0].centis, 52);
        assert_eq!(track.units[1].centis, 208);
        assert_eq!(track.allocated_centis(), 260);
    }

    #[test]
    fn test_per_word_drift_goes_to_last_word() {
        let alloc = allocate_per_word(&["abc", "abc", "abc"], 100);
        assert_eq!(alloc, vec![33, 33, 34]);
    }

    #[test]
    fn test_per_word_minimum_one_with_overshoot_reclaimed() {
        // Both "a"s floor to zero and are lifted to one; the long word pays.
        let alloc = allocate_per_word(&["a", "a", "abcdefgh"], 5);
        assert_eq!(alloc, vec![1, 1, 3]);
    }

    #[test]
    fn test_per_character_counts_spaces() {
        let track = CaptionTrack::compile("  a b  ", 3.0, RevealEffect::PerCharacter);
        let texts: Vec<&str> = track.units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["a", " ", "b"]);
        assert!(track.units.iter().all(|u| u.centis == 100));
    }

    #[test]
    fn test_per_character_never_zero() {
        let long = "x".repeat(500);
        let track = CaptionTrack::compile(&long, 1.0, RevealEffect::PerCharacter);
        assert!(track.units.iter().all(|u| u.centis >= 1));
    }

    #[test]
    fn test_whole_line_effects_have_single_unit() {
        for effect in [
            RevealEffect::SmoothFill,
            RevealEffect::FadeIn,
            RevealEffect::Pop,
            RevealEffect::Static,
        ] {
            let track = CaptionTrack::compile("The whole line", 4.0, effect);
            assert_eq!(track.units.len(), 1);
            assert_eq!(track.units[0].centis, 400);
            assert_eq!(track.plain_text(), "The whole line");
        }
    }

    #[test]
    fn test_empty_text_single_empty_unit() {
        let track = CaptionTrack::compile("   ", 5.0, RevealEffect::PerWord);
        assert_eq!(track.units, vec![RevealUnit::new("", 500)]);
        assert!(track.is_empty());
    }

    #[test]
    fn test_tiny_duration_still_one_centisecond() {
        let track = CaptionTrack::compile("Hello", 0.001, RevealEffect::SmoothFill);
        assert_eq!(track.total_centis, 1);
        assert_eq!(track.fade_in_ms(), 10);
    }

    #[test]
    fn test_event_bounds() {
        let track = CaptionTrack::compile("Hello world", 7.25, RevealEffect::PerWord);
        assert_eq!(track.start_timestamp(), "0:00:00.00");
        assert_eq!(track.end_timestamp(), "0:00:07.25");
    }

    proptest! {
        #[test]
        fn prop_per_word_sums_to_total(
            words in proptest::collection::vec("[a-zA-Z']{1,14}", 1..25),
            duration in 0.5f64..60.0,
        ) {
            let text = words.join(" ");
            let track = CaptionTrack::compile(&text, duration, RevealEffect::PerWord);
            prop_assert_eq!(track.units.len(), words.len());
            prop_assert!(track.units.iter().all(|u| u.centis >= 1));
            prop_assert_eq!(track.allocated_centis(), total_centis(duration));
        }

        #[test]
        fn prop_static_is_one_unit_spanning_scene(
            text in "[a-z ]{0,40}",
            duration in 0.1f64..30.0,
        ) {
            let track = CaptionTrack::compile(&text, duration, RevealEffect::Static);
            prop_assert_eq!(track.units.len(), 1);
            prop_assert_eq!(track.units[0].centis, total_centis(duration));
            prop_assert_eq!(track.start_secs, 0.0);
            prop_assert!((track.end_secs - duration).abs() < 1e-9);
        }
    }
}
