//! lepel-core: resolver de dependencias y sequencer de steps con checkpoints.
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod injection;
pub mod key;
pub mod step;
pub mod variables;

pub use checkpoint::{CheckpointRecord, CheckpointStore, ExecutionMode, InMemoryCheckpointStore, Snapshot};
pub use config::{ConfigMap, ConfigSetting};
pub use engine::{Pipeline, PipelineBuilder, StepLogger};
pub use errors::{PipelineError, Result};
pub use injection::{Args, DependencyManager, FnFactory, Injectable, Param, Registration, Stateful};
pub use key::{TypeKey, ValueKind};
pub use step::{AsyncPipelineStep, CheckpointMarker, PipelineItem, PipelineStep, TypedStep};
pub use variables::Variables;
