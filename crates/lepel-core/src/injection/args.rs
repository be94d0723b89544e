//! Instancias erasadas y argumentos resueltos.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{PipelineError, Result};
use crate::key::TypeKey;

/// Instancia producida por un provider.
///
/// Guarda un `Arc<T>` (con `T` posiblemente `dyn Trait`) dentro de un
/// `Arc<dyn Any>`; recuperar el `Arc<T>` clona el puntero, así que un
/// singleton siempre devuelve la misma referencia.
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self { key: TypeKey::of::<T>(),
               inner: Arc::new(value) }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").field("key", &self.key).finish()
    }
}

/// Valor resuelto para un parámetro.
#[derive(Debug, Clone)]
pub enum Resolved {
    Instance(Instance),
    Value(Value),
}

/// Argumentos resueltos, en el orden en que se declararon los parámetros.
#[derive(Debug, Clone, Default)]
pub struct Args {
    entries: IndexMap<String, Resolved>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Resolved) {
        self.entries.insert(name.into(), value);
    }

    pub fn raw(&self, name: &str) -> Option<&Resolved> {
        self.entries.get(name)
    }

    /// Instancia inyectada por tipo.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        match self.entries.get(name) {
            Some(Resolved::Instance(inst)) => inst.downcast::<T>().ok_or_else(|| mismatch::<T>(name, inst.key().name())),
            Some(Resolved::Value(v)) => Err(mismatch::<T>(name, &format!("value {v}"))),
            None => Err(PipelineError::lookup(name)),
        }
    }

    /// Valor plano deserializado en `T`.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        match self.entries.get(name) {
            Some(Resolved::Value(v)) => serde_json::from_value(v.clone()).map_err(|e| mismatch::<T>(name, &e.to_string())),
            Some(Resolved::Instance(inst)) => Err(mismatch::<T>(name, inst.key().name())),
            None => Err(PipelineError::lookup(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mismatch<T: ?Sized>(name: &str, found: &str) -> PipelineError {
    PipelineError::TypeMismatch { name: name.to_string(),
                                  expected: std::any::type_name::<T>().to_string(),
                                  found: found.to_string() }
}
