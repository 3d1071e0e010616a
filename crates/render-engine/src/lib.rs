//! Storyreel Render Engine
//!
//! Turns a job (images + caption script + style choices) into one video by
//! driving an external transcoding engine scene by scene.
//!
//! # Pipeline Architecture
//!
//! ```text
//! images ──┐
//!          ├── ResolveScript (one caption per image)
//! script ──┘         │
//!                    ├── Narration (speech service, optional)
//!                    │         │
//!                    │         ├── Duration (probe or default)
//!                    │         │         │
//!                    │         │         ├── Caption timing -> scene_N.ass
//!                    │         │         │         │
//!                    ▼         ▼         ▼         ▼
//!              resize/pad ─ grade ─ zoom ─ captions ─ fade
//!                                                    │
//!                                                    ▼
//!                                          scene_N.mp4 (per scene)
//!                                                    │
//!                                                    ▼
//!                                   concat (stream copy) ── music mix
//!                                                    │
//!                                                    ▼
//!                                               <job>.mp4
//! ```

pub mod assembly;
pub mod engine;
pub mod escape;
pub mod filter_chain;
pub mod fonts;
pub mod locator;
pub mod pipeline;
pub mod scene;

pub use engine::{EngineInput, EngineInvocation, FfmpegEngine, TranscodeEngine};
pub use filter_chain::{CaptionOverlay, FilterChain, FilterStage};
pub use locator::{EngineLocator, LocatedEngine};
pub use pipeline::{Pipeline, PipelineSettings, ProgressCallback};
pub use scene::RenderedClip;
