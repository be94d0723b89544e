//! Protocolo de steps: unidad de trabajo síncrona, asíncrona y tipada, más
//! el marcador de checkpoint.

pub mod definition;
pub mod marker;
pub mod typed;

pub use definition::{AsyncPipelineStep, PipelineStep};
pub use marker::{CheckpointMarker, PipelineItem};
pub use typed::TypedStep;
