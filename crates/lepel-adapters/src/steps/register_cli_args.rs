use lepel_core::config::merge_config;
use lepel_core::injection::{Args, DependencyManager};
use lepel_core::{PipelineStep, Result};
use serde_json::Value;

use crate::cli_args::cli_args_to_config;

/// Vuelca flags `--clave valor` a la configuración del pipeline.
#[derive(Debug, Clone, Default)]
pub struct RegisterCliArgsToConfig {
    tokens: Vec<String>,
}

impl RegisterCliArgsToConfig {
    pub fn new<I, S>(tokens: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { tokens: tokens.into_iter().map(Into::into).collect() }
    }

    /// Tokens del proceso actual, sin el nombre del programa.
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }
}

impl PipelineStep for RegisterCliArgsToConfig {
    fn run(&mut self, _args: &Args, deps: &mut DependencyManager) -> Result<Value> {
        let parsed = cli_args_to_config(&self.tokens);
        if !parsed.is_empty() {
            merge_config(deps.config_mut(), &parsed);
        }
        Ok(Value::Null)
    }
}
