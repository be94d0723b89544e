//! Builder para `Pipeline`.
//!
//! Resuelve el checkpoint de reanudación (si se pidió) contra el store en el
//! momento de construir, de modo que un nombre inexistente o un store vacío
//! fallan antes de ejecutar ningún step.

use serde_json::Value;
use uuid::Uuid;

use super::logger::StepLogger;
use super::pipeline::Pipeline;
use crate::checkpoint::{latest_checkpoint, CheckpointRecord, CheckpointState, CheckpointStore, InMemoryCheckpointStore};
use crate::config::{merge_config, ConfigMap};
use crate::errors::Result;
use crate::injection::DependencyManager;
use crate::variables::{Variables, RUN_ID};

/// Nombre especial: el checkpoint modificado más recientemente.
pub const LATEST: &str = "latest";

#[derive(Default)]
pub struct PipelineBuilder {
    config: ConfigMap,
    overrides: ConfigMap,
    variables: Variables,
    store: Option<Box<dyn CheckpointStore>>,
    resume: Option<String>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuración base (normalmente cargada de disco).
    pub fn config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Valores que ganan sobre la configuración base, también tras restaurar
    /// un snapshot.
    pub fn overrides(mut self, overrides: ConfigMap) -> Self {
        self.overrides = overrides;
        self
    }

    /// Variable de esta ejecución; sobrevive a la restauración de un snapshot.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.set(name, value);
        self
    }

    pub fn store(self, store: impl CheckpointStore + 'static) -> Self {
        self.boxed_store(Box::new(store))
    }

    pub fn boxed_store(mut self, store: Box<dyn CheckpointStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Reanuda desde `name` (o `"latest"`).
    pub fn resume_from(mut self, name: impl Into<String>) -> Self {
        self.resume = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let store = self.store.unwrap_or_else(|| Box::new(InMemoryCheckpointStore::new()));

        let state = match self.resume {
            None => CheckpointState::live(),
            Some(requested) => {
                let name = if requested == LATEST {
                    latest_checkpoint(store.as_ref())?
                } else {
                    requested
                };
                let record = CheckpointRecord::decode(&store.load(&name)?)?;
                log::info!("Resuming from checkpoint \"{}\" saved by run {} at {}",
                           name,
                           record.run_id,
                           record.created_at);
                CheckpointState::resume(name, record.snapshot)
            }
        };

        let run_id = Uuid::new_v4();
        let mut config = self.config;
        merge_config(&mut config, &self.overrides);

        let mut deps = DependencyManager::new(config);
        let pinned: Vec<(String, Value)> = self.variables
                                               .iter()
                                               .map(|(k, v)| (k.clone(), v.clone()))
                                               .collect();
        deps.update_variables(pinned);
        deps.variables_mut().set(RUN_ID, run_id.to_string());
        if !deps.contains::<StepLogger>() {
            deps.register::<StepLogger>()?;
        }

        Ok(Pipeline::new(deps, store, state, run_id, self.overrides, self.variables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[test]
    fn resume_needs_an_existing_checkpoint() {
        let err = PipelineBuilder::new().resume_from(LATEST).build().unwrap_err();
        assert_eq!(err, PipelineError::CheckpointNotFound("latest".into()));

        let err = PipelineBuilder::new().resume_from("missing").build().unwrap_err();
        assert_eq!(err, PipelineError::CheckpointNotFound("missing".into()));
    }

    #[test]
    fn overrides_win_over_base_config() {
        let mut base = ConfigMap::new();
        base.insert("foo".into(), 1.into());
        let mut overrides = ConfigMap::new();
        overrides.insert("foo".into(), 2.into());

        let pipeline = PipelineBuilder::new().config(base).overrides(overrides).build().unwrap();
        assert_eq!(pipeline.dependencies().config().get("foo"), Some(&Value::from(2)));
        assert!(pipeline.dependencies().contains::<StepLogger>());
    }
}
