//! Storyreel Speech: narration synthesis
//!
//! Two pieces:
//! - [`SpeechClient`]: posts caption text to an OpenAI-compatible
//!   `/v1/audio/speech` endpoint and returns the audio bytes
//! - [`SpeechService`]: owns a locally launched service process
//!   (`start`, `is_alive`, `stop`)
//!
//! The pipeline depends only on the [`SpeechSynthesizer`] trait.

pub mod client;
pub mod service;

pub use client::{SpeechClient, SpeechSynthesizer};
pub use service::SpeechService;
