use crate::errors::Result;
use crate::injection::{Args, Injectable, Param};
use crate::variables::PIPELINE_STEP;

/// Logger inyectable cuyo target es el step en ejecución.
///
/// Se registra como transient, así que cada resolución toma el valor actual
/// de `pipeline_step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLogger {
    target: String,
}

impl StepLogger {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn info(&self, message: &str) {
        log::info!(target: self.target.as_str(), "{message}");
    }

    pub fn warn(&self, message: &str) {
        log::warn!(target: self.target.as_str(), "{message}");
    }

    pub fn debug(&self, message: &str) {
        log::debug!(target: self.target.as_str(), "{message}");
    }
}

impl Injectable for StepLogger {
    fn dependencies() -> Vec<Param> {
        vec![Param::of::<String>(PIPELINE_STEP).with_default("pipeline")]
    }

    fn construct(args: &Args) -> Result<Self> {
        Ok(Self::new(args.value::<String>(PIPELINE_STEP)?))
    }
}
