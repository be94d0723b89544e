//! Capacidad `Stateful`: singletons que participan en los checkpoints.

use serde_json::Value;

use crate::errors::Result;

/// Un singleton que puede volcar y recuperar su estado.
///
/// Ambos métodos toman `&self` porque el singleton se comparte detrás de un
/// `Arc`; la implementación guarda su estado con mutabilidad interior.
pub trait Stateful: Send + Sync {
    fn state_dict(&self) -> Value;

    fn load_state_dict(&self, state: Value) -> Result<()>;
}
