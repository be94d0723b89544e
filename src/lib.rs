//! Lepel Rust Library
//!
//! Fachada del workspace:
//! - raíz: todo `lepel-core` (resolver de dependencias, sequencer, checkpoints).
//! - `adapters`: configuración en disco, flags de CLI, store de checkpoints en
//!   ficheros, estado de git y `run_pipeline` (`lepel-adapters`).
//!
//! `prelude` reúne lo que necesita la definición típica de un pipeline.

pub use lepel_adapters as adapters;
pub use lepel_core::*;

pub mod prelude {
    pub use lepel_adapters::{cli_args_to_config, run_pipeline, RunOptions};
    pub use lepel_core::injection::{Args, DependencyManager, Injectable, Param, Stateful};
    pub use lepel_core::{AsyncPipelineStep, Pipeline, PipelineError, PipelineItem, PipelineStep, Result, StepLogger,
                         TypedStep, ValueKind};
}
