//! Error types shared across storyreel crates.

use std::path::PathBuf;

/// Top-level error type for storyreel jobs.
#[derive(Debug, thiserror::Error)]
pub enum StoryreelError {
    #[error("Transcoding engine not found: {binary} is not installed or not in PATH")]
    EngineMissing { binary: String },

    #[error("Invalid job input: {message}")]
    InputContract { message: String },

    #[error("Transcoding engine failed: {message}")]
    EngineFailure { message: String },

    #[error("Speech synthesis failed at {endpoint}: {message}")]
    SpeechSynthesis { endpoint: String, message: String },

    #[error("Scene {index}: {source}")]
    Scene {
        index: usize,
        #[source]
        source: Box<StoryreelError>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoryreelError.
pub type StoryreelResult<T> = Result<T, StoryreelError>;

impl StoryreelError {
    pub fn engine_missing(binary: impl Into<String>) -> Self {
        Self::EngineMissing {
            binary: binary.into(),
        }
    }

    pub fn input_contract(msg: impl Into<String>) -> Self {
        Self::InputContract {
            message: msg.into(),
        }
    }

    pub fn engine_failure(msg: impl Into<String>) -> Self {
        Self::EngineFailure {
            message: msg.into(),
        }
    }

    pub fn speech(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SpeechSynthesis {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Attach a 1-based scene index to an error raised while processing that scene.
    pub fn in_scene(self, index: usize) -> Self {
        match self {
            already @ Self::Scene { .. } => already,
            other => Self::Scene {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Scene index carried by this error, if any.
    pub fn scene_index(&self) -> Option<usize> {
        match self {
            Self::Scene { index, .. } => Some(*index),
            _ => None,
        }
    }
}
