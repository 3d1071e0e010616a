//! Scene duration resolution.
//!
//! A narrated scene plays for exactly as long as its narration; everything
//! else plays for the tier's default. Probe failures are not errors.

use std::path::Path;

use storyreel_job_model::style::QualityTier;

/// Anything that can report a media file's duration in seconds.
pub trait DurationProbe {
    /// `None` when the duration cannot be determined.
    fn probe_duration(&self, media: &Path) -> Option<f64>;
}

impl<F> DurationProbe for F
where
    F: Fn(&Path) -> Option<f64>,
{
    fn probe_duration(&self, media: &Path) -> Option<f64> {
        self(media)
    }
}

/// Fallback scene lengths per quality tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationDefaults {
    pub preview_secs: f64,
    pub final_secs: f64,
}

impl Default for DurationDefaults {
    fn default() -> Self {
        Self {
            preview_secs: 3.0,
            final_secs: 5.0,
        }
    }
}

impl DurationDefaults {
    pub fn for_tier(&self, tier: QualityTier) -> f64 {
        match tier {
            QualityTier::Preview => self.preview_secs,
            QualityTier::Final => self.final_secs,
        }
    }
}

/// Authoritative playback duration for a scene.
pub fn resolve_duration(
    narration: Option<&Path>,
    default_secs: f64,
    probe: &impl DurationProbe,
) -> f64 {
    let Some(audio) = narration else {
        return default_secs;
    };

    match probe.probe_duration(audio) {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            tracing::debug!(path = %audio.display(), duration_secs = secs, "Probed narration");
            secs
        }
        other => {
            tracing::warn!(
                path = %audio.display(),
                probed = ?other,
                default_secs,
                "Narration duration unavailable, using default"
            );
            default_secs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_narration_uses_default() {
        let probe = |_: &Path| -> Option<f64> { panic!("probe must not run") };
        assert_eq!(resolve_duration(None, 5.0, &probe), 5.0);
    }

    #[test]
    fn test_probed_duration_is_authoritative() {
        let probe = |_: &Path| Some(7.25);
        let audio = PathBuf::from("narration.mp3");
        assert_eq!(resolve_duration(Some(&audio), 5.0, &probe), 7.25);
    }

    #[test]
    fn test_probe_failure_falls_back() {
        let audio = PathBuf::from("narration.mp3");
        assert_eq!(resolve_duration(Some(&audio), 3.0, &|_: &Path| None), 3.0);
        assert_eq!(resolve_duration(Some(&audio), 3.0, &|_: &Path| Some(0.0)), 3.0);
        assert_eq!(resolve_duration(Some(&audio), 3.0, &|_: &Path| Some(f64::NAN)), 3.0);
    }

    #[test]
    fn test_defaults_per_tier() {
        let defaults = DurationDefaults::default();
        assert!(defaults.for_tier(QualityTier::Preview) < defaults.for_tier(QualityTier::Final));
    }
}
