//! Timecode utilities.
//!
//! Caption timing works in centiseconds (1/100 s), the native granularity of
//! Advanced SubStation karaoke tags. Scene lengths travel as `f64` seconds and
//! are converted here so every crate rounds the same way.

/// Centiseconds per second.
pub const CENTIS_PER_SEC: u32 = 100;

/// Guard against `2.3 * 100.0 == 229.99999999999997` style truncation.
const FLOOR_EPSILON: f64 = 1e-6;

/// Convert seconds to whole centiseconds, rounding down.
///
/// Negative and non-finite inputs map to zero.
pub fn secs_to_centis(secs: f64) -> u32 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    let centis = (secs * CENTIS_PER_SEC as f64 + FLOOR_EPSILON).floor();
    centis.min(u32::MAX as f64) as u32
}

/// Convert centiseconds back to seconds.
pub fn centis_to_secs(centis: u32) -> f64 {
    centis as f64 / CENTIS_PER_SEC as f64
}

/// Format centiseconds as an ASS timestamp: `H:MM:SS.CC`.
pub fn format_ass_time(centis: u32) -> String {
    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6_000;
    let seconds = (centis % 6_000) / 100;
    let cs = centis % 100;
    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}

/// Format seconds the way engine `-t` / `st=` arguments expect them.
pub fn format_engine_secs(secs: f64) -> String {
    format!("{:.3}", secs.max(0.0))
}

/// Number of frames needed to cover `duration_secs` at `fps`.
pub fn frame_count(duration_secs: f64, fps: u32) -> u32 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 1;
    }
    ((duration_secs * fps.max(1) as f64) - FLOOR_EPSILON)
        .ceil()
        .max(1.0) as u32
}
