//! Contrato de almacenamiento de checkpoints y store en memoria.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

use crate::errors::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointEntry {
    pub name: String,
    pub modified: DateTime<Utc>,
}

/// Store de blobs opacos indexados por nombre. Guardar con un nombre
/// existente reemplaza el blob y actualiza su fecha de modificación.
pub trait CheckpointStore {
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()>;
    /// `CheckpointNotFound` si no existe.
    fn load(&self, name: &str) -> Result<Vec<u8>>;
    fn list(&self) -> Result<Vec<CheckpointEntry>>;
}

/// Nombre del checkpoint modificado más recientemente.
pub fn latest_checkpoint(store: &dyn CheckpointStore) -> Result<String> {
    store.list()?
         .into_iter()
         .max_by_key(|e| e.modified)
         .map(|e| e.name)
         .ok_or_else(|| PipelineError::CheckpointNotFound("latest".into()))
}

/// Store en memoria. Las fechas de modificación son estrictamente crecientes
/// aunque dos guardados caigan en el mismo instante de reloj.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    inner: IndexMap<String, (DateTime<Utc>, Vec<u8>)>,
    last: Option<DateTime<Utc>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.last = Some(next);
        next
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        let modified = self.tick();
        self.inner.insert(name.to_string(), (modified, blob.to_vec()));
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        self.inner
            .get(name)
            .map(|(_, blob)| blob.clone())
            .ok_or_else(|| PipelineError::CheckpointNotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<CheckpointEntry>> {
        Ok(self.inner
               .iter()
               .map(|(name, (modified, _))| CheckpointEntry { name: name.clone(),
                                                              modified: *modified })
               .collect())
    }
}
