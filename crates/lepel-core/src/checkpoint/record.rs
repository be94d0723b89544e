//! Registro persistible de un checkpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::snapshot::Snapshot;
use crate::errors::{PipelineError, Result};
use crate::hashing::hash_value;

/// Lo que el store guarda bajo el nombre del marcador. El store lo trata
/// como bytes opacos (`encode`/`decode`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub name: String,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// blake3 del JSON canónico de `snapshot`.
    pub fingerprint: String,
    pub snapshot: Snapshot,
}

impl CheckpointRecord {
    pub fn new(name: impl Into<String>, run_id: Uuid, snapshot: Snapshot) -> Result<Self> {
        let fingerprint = fingerprint(&snapshot)?;
        Ok(Self { name: name.into(),
                  run_id,
                  created_at: Utc::now(),
                  fingerprint,
                  snapshot })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodifica y verifica el fingerprint.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let record: Self = serde_json::from_slice(bytes)?;
        let actual = fingerprint(&record.snapshot)?;
        if actual != record.fingerprint {
            return Err(PipelineError::Snapshot(format!("fingerprint mismatch for checkpoint \"{}\"", record.name)));
        }
        Ok(record)
    }
}

fn fingerprint(snapshot: &Snapshot) -> Result<String> {
    Ok(hash_value(&serde_json::to_value(snapshot)?))
}
