//! Storyreel Common Utilities
//!
//! Shared infrastructure for all storyreel crates:
//! - Error types and result aliases
//! - Centisecond timecode helpers used by caption timing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
