use lepel_core::config::{ensure_required_config_values, ensure_required_global, ConfigRegistry};
use lepel_core::injection::{Args, DependencyManager};
use lepel_core::{PipelineStep, Result};
use serde_json::Value;

/// Falla si alguna propiedad registrada falta o tiene otro tipo.
///
/// Sin registro propio valida contra el global, que siempre incluye las
/// propiedades de los steps de este crate.
#[derive(Debug, Clone, Default)]
pub struct EnsureRequiredConfigValues {
    /// `None`: registro global del proceso.
    registry: Option<ConfigRegistry>,
}

impl EnsureRequiredConfigValues {
    pub fn global() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: ConfigRegistry) -> Self {
        Self { registry: Some(registry) }
    }
}

impl PipelineStep for EnsureRequiredConfigValues {
    fn run(&mut self, _args: &Args, deps: &mut DependencyManager) -> Result<Value> {
        match &self.registry {
            Some(registry) => ensure_required_config_values(deps.config(), registry)?,
            None => {
                super::register_builtin_settings();
                ensure_required_global(deps.config())?
            }
        }
        Ok(Value::Null)
    }
}
