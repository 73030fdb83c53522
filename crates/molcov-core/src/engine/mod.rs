//! Orchestration layer: pattern resolution, record filtering, and the
//! parallel matching pipeline.

pub mod environment;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod resolver;

pub use error::EngineError;
pub use progress::{Progress, ProgressCallback, ProgressReporter};
