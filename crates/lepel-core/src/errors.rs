//! Errores del núcleo (registro, resolución, replay y checkpoints).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PipelineError {
    #[error("dependency with type \"{key}\" already registered")]
    RegistrationConflict { key: String },
    #[error("cannot register dependency: {0}")]
    Registration(String),
    #[error("Cannot resolve dependency for parameter \"{parameter}\"")]
    Lookup { parameter: String },
    #[error("argument \"{name}\" has type {found}, expected {expected}")]
    TypeMismatch { name: String, expected: String, found: String },
    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    ConfigValidation(Vec<String>),
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),
    #[error("insufficient replay data: step {step_index} requested but only {recorded} results recorded")]
    InsufficientReplayData { step_index: usize, recorded: usize },
    #[error("invalid snapshot: {0}")]
    Snapshot(String),
    #[error("checkpoint store: {0}")]
    Store(String),
    #[error("i/o: {0}")]
    Io(String),
    #[error("step {step} failed: {message}")]
    Step { step: String, message: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Atajo para errores producidos dentro de `run` de un step.
    pub fn step(step: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Step { step: step.into(),
                     message: message.to_string() }
    }

    pub fn lookup(parameter: impl Into<String>) -> Self {
        Self::Lookup { parameter: parameter.into() }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
