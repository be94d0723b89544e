//! Snapshot del estado de un `DependencyManager`.
//!
//! Contiene el estado de cada singleton `Stateful` (en orden de registro),
//! la configuración y la bolsa de variables completa (incluidos los
//! resultados grabados de cada step). Se restaura por clave de tipo; el
//! orden sólo refleja el orden de captura.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigMap;
use crate::errors::Result;
use crate::injection::DependencyManager;
use crate::variables::Variables;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingletonState {
    /// Nombre completo del tipo del singleton.
    pub key: String,
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub states: Vec<SingletonState>,
    pub config: ConfigMap,
    pub variables: Variables,
}

impl Snapshot {
    pub fn capture(deps: &DependencyManager) -> Self {
        let states = deps.stateful_singletons()
                         .into_iter()
                         .map(|(key, singleton)| SingletonState { key: key.name().to_string(),
                                                                  state: singleton.state_dict() })
                         .collect();
        Self { states,
               config: deps.config().clone(),
               variables: deps.variables().clone() }
    }

    /// Restaura cada singleton registrado cuyo tipo aparezca en el snapshot,
    /// luego reemplaza configuración y variables.
    pub fn restore(&self, deps: &mut DependencyManager) -> Result<()> {
        let live = deps.stateful_singletons();
        for entry in &self.states {
            match live.iter().find(|(key, _)| key.name() == entry.key) {
                Some((_, singleton)) => singleton.load_state_dict(entry.state.clone())?,
                None => log::warn!("snapshot state for {} has no registered singleton; skipped", entry.key),
            }
        }
        self.restore_bags(deps);
        Ok(())
    }

    /// Restauración por posición: el i-ésimo estado va al i-ésimo singleton
    /// `Stateful` registrado. Sólo es correcta si el orden de registro no
    /// cambió entre la ejecución que guardó y la que carga.
    pub fn restore_positional(&self, deps: &mut DependencyManager) -> Result<()> {
        let live = deps.stateful_singletons();
        if live.len() != self.states.len() {
            log::warn!("positional restore of {} states into {} singletons",
                       self.states.len(),
                       live.len());
        }
        for ((_, singleton), entry) in live.iter().zip(&self.states) {
            singleton.load_state_dict(entry.state.clone())?;
        }
        self.restore_bags(deps);
        Ok(())
    }

    fn restore_bags(&self, deps: &mut DependencyManager) {
        deps.set_config(self.config.clone());
        deps.set_variables(self.variables.clone());
    }

    /// Resultados grabados de los steps ejecutados antes del snapshot.
    pub fn recorded_results(&self) -> &[Value] {
        self.variables.results()
    }
}
