//! Storyreel Job Model
//!
//! Defines the data contracts for a narrated slideshow job:
//! - **Style:** Aspect ratio, quality tier, colour grade, reveal effect, text colour
//! - **Script:** Caption script parsing and image/caption reconciliation
//! - **Scene:** One image paired with its caption and resolved attributes
//! - **Job:** The request, its configuration, progress reports, and the final artifact

pub mod job;
pub mod scene;
pub mod script;
pub mod style;

pub use job::*;
pub use scene::*;
pub use script::*;
pub use style::*;
