use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::injection::{Args, DependencyManager, Param};
use crate::key::short_type_name;

/// Unidad de trabajo de un pipeline.
///
/// Un step se identifica por el nombre de su tipo (no por un id declarado);
/// ese nombre aparece en los logs y en la variable `pipeline_step`.
/// Sus parámetros se declaran con `params()` y el sequencer los resuelve
/// antes de invocar `run`.
pub trait PipelineStep {
    /// Nombre corto del tipo implementador.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Parámetros que el resolver debe inyectar.
    fn params(&self) -> Vec<Param> {
        Vec::new()
    }

    /// Ejecuta el step. `Value::Null` equivale a "sin resultado".
    fn run(&mut self, args: &Args, deps: &mut DependencyManager) -> Result<Value>;
}

/// Variante asíncrona; el sequencer la espera antes de continuar.
#[async_trait]
pub trait AsyncPipelineStep: Send {
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn params(&self) -> Vec<Param> {
        Vec::new()
    }

    async fn arun(&mut self, args: Args, deps: &mut DependencyManager) -> Result<Value>;
}
