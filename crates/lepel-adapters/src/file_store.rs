//! Store de checkpoints en disco: un fichero por nombre dentro de un directorio.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lepel_core::checkpoint::{CheckpointEntry, CheckpointStore};
use lepel_core::{PipelineError, Result};

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// El directorio se crea en el primer `save`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PipelineError::Store(format!("invalid checkpoint name \"{name}\"")));
        }
        Ok(self.dir.join(name))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).map_err(AdapterError::io(&self.dir))?;
        fs::write(&path, blob).map_err(AdapterError::io(&path))?;
        log::debug!("checkpoint \"{name}\" written to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PipelineError::CheckpointNotFound(name.to_string())),
            Err(e) => Err(AdapterError::Io { path, source: e }.into()),
        }
    }

    fn list(&self) -> Result<Vec<CheckpointEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AdapterError::io(&self.dir)(e).into()),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(AdapterError::io(&self.dir))?;
            let meta = entry.metadata().map_err(AdapterError::io(entry.path()))?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().map_err(AdapterError::io(entry.path()))?;
            out.push(CheckpointEntry { name: entry.file_name().to_string_lossy().into_owned(),
                                       modified: DateTime::<Utc>::from(modified) });
        }
        out.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(out)
    }
}
