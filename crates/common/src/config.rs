//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where final artifacts are written.
    pub output_dir: PathBuf,

    /// Directory for per-job intermediates (clips, narration, subtitles).
    pub work_dir: PathBuf,

    /// Transcoding engine location overrides.
    pub engine: EngineConfig,

    /// Speech-synthesis service settings.
    pub speech: SpeechConfig,

    /// Rendering defaults.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Explicit engine binary locations. `None` means "discover".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Speech-synthesis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Service base URL, e.g. `http://127.0.0.1:8880`.
    pub base_url: String,

    /// Path of the synthesis endpoint, relative to `base_url`.
    pub speech_path: String,

    /// Path of the lightweight liveness endpoint.
    pub health_path: String,

    /// Bearer token sent with every request.
    pub api_key: String,

    /// Model identifier sent in the request body.
    pub model: String,

    /// Voice used when a job does not name one.
    pub default_voice: String,

    /// Request timeout for a single synthesis call.
    pub timeout_secs: u64,

    /// Command that starts a local service when it is not reachable.
    pub autostart: Option<ServiceCommand>,

    /// How long to wait for an auto-started service to become healthy.
    pub startup_timeout_secs: u64,
}

/// A program plus arguments used to launch the speech service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Rendering defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Output frame rate for every scene.
    pub fps: u32,

    /// Scene length without narration, preview tier.
    pub preview_default_secs: f64,

    /// Scene length without narration, final tier.
    pub final_default_secs: f64,

    /// Background-music gain applied before mixing.
    pub music_volume: f64,

    /// Keep clips, narration, and subtitle files after a successful job.
    pub keep_intermediates: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "storyreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            output_dir: data.join("outputs"),
            work_dir: data.join("work"),
            engine: EngineConfig::default(),
            speech: SpeechConfig::default(),
            render: RenderDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8880".to_string(),
            speech_path: "/v1/audio/speech".to_string(),
            health_path: "/v1/models".to_string(),
            api_key: "not-needed".to_string(),
            model: "kokoro".to_string(),
            default_voice: "af_bella".to_string(),
            timeout_secs: 60,
            autostart: None,
            startup_timeout_secs: 30,
        }
    }
}

impl SpeechConfig {
    /// Full URL of the synthesis endpoint.
    pub fn speech_url(&self) -> String {
        join_url(&self.base_url, &self.speech_path)
    }

    /// Full URL of the liveness endpoint.
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            preview_default_secs: 3.0,
            final_default_secs: 5.0,
            music_volume: 0.15,
            keep_intermediates: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from(&config_file_path());
        config.apply_env_overrides();
        config
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Apply `STORYREEL_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|key| std::env::var(key).ok());
    }

    fn apply_overrides_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STORYREEL_SPEECH_URL").filter(|v| !v.trim().is_empty()) {
            self.speech.base_url = url.trim().to_string();
        }
        if let Some(key) = lookup("STORYREEL_SPEECH_API_KEY").filter(|v| !v.is_empty()) {
            self.speech.api_key = key;
        }
        if let Some(path) = lookup("STORYREEL_FFMPEG").filter(|v| !v.trim().is_empty()) {
            self.engine.ffmpeg_path = Some(PathBuf::from(path.trim()));
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("storyreel").join("config.json")
}

/// Default data directory.
fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    base.join("storyreel")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
