//! Sequencer de steps con soporte de checkpoints.

pub mod builder;
pub mod logger;
pub mod pipeline;

pub use builder::{PipelineBuilder, LATEST};
pub use logger::StepLogger;
pub use pipeline::Pipeline;
