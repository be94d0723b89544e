//! `run_pipeline`: prepara el directorio de salida, la configuración, el
//! store de checkpoints y ejecuta el cuerpo del pipeline.
//!
//! Pasos:
//! 1. Crea `output_dir`.
//! 2. Carga el fichero de configuración (si hay) y lo copia a `output_dir`.
//! 3. Guarda el estado de git en `output_dir/git` (si hay repositorio).
//! 4. Abre `FileCheckpointStore` en `output_dir/checkpoints`; allí se buscan
//!    también los checkpoints al reanudar.
//! 5. Construye el `Pipeline` (overrides de CLI incluidos, `output_dir` en
//!    las variables) y ejecuta `body`.

use std::fs;
use std::path::{Path, PathBuf};

use lepel_core::variables::OUTPUT_DIR;
use lepel_core::{ConfigMap, Pipeline, Result};

use crate::config_file::load_config;
use crate::env::EnvDefaults;
use crate::error::AdapterError;
use crate::file_store::FileCheckpointStore;
use crate::git::save_git_status;

pub const CHECKPOINT_DIR: &str = "checkpoints";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    /// Nombre del checkpoint o `"latest"`.
    pub checkpoint: Option<String>,
    pub overrides: ConfigMap,
    pub capture_git: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("."),
               config_file: None,
               checkpoint: None,
               overrides: ConfigMap::new(),
               capture_git: true }
    }
}

impl RunOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(),
               ..Self::default() }
    }

    /// Defaults tomados de `LEPEL_*` (y `.env`).
    pub fn from_env() -> Self {
        let env = EnvDefaults::from_env();
        Self { output_dir: env.output_dir.unwrap_or_else(|| PathBuf::from(".")),
               config_file: env.config_file,
               checkpoint: env.checkpoint,
               ..Self::default() }
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn checkpoint(mut self, name: impl Into<String>) -> Self {
        self.checkpoint = Some(name.into());
        self
    }

    pub fn overrides(mut self, overrides: ConfigMap) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn capture_git(mut self, enabled: bool) -> Self {
        self.capture_git = enabled;
        self
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.output_dir.join(CHECKPOINT_DIR)
    }
}

/// Ejecuta `body` sobre un pipeline preparado y lo devuelve al terminar.
pub fn run_pipeline<F>(options: RunOptions, body: F) -> Result<Pipeline>
    where F: FnOnce(&mut Pipeline) -> Result<()>
{
    let output_dir = options.output_dir.as_path();
    fs::create_dir_all(output_dir).map_err(AdapterError::io(output_dir))?;

    let config = match &options.config_file {
        Some(path) => {
            let config = load_config(path)?;
            copy_into(path, output_dir)?;
            config
        }
        None => ConfigMap::new(),
    };

    if options.capture_git {
        save_git_status(output_dir)?;
    }

    let mut builder = Pipeline::builder().config(config)
                                         .overrides(options.overrides.clone())
                                         .variable(OUTPUT_DIR, output_dir.to_string_lossy().into_owned())
                                         .store(FileCheckpointStore::new(options.checkpoint_dir()));
    if let Some(name) = &options.checkpoint {
        builder = builder.resume_from(name.clone());
    }

    let mut pipeline = builder.build()?;
    log::info!("Pipeline run {} writing to {}", pipeline.run_id(), output_dir.display());
    body(&mut pipeline)?;
    Ok(pipeline)
}

/// Copia `file` a `dir` salvo que ya esté allí.
fn copy_into(file: &Path, dir: &Path) -> Result<()> {
    let Some(name) = file.file_name() else {
        return Ok(());
    };
    let destination = dir.join(name);
    let same = match (fs::canonicalize(file), fs::canonicalize(&destination)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same {
        fs::copy(file, &destination).map_err(AdapterError::io(&destination))?;
    }
    Ok(())
}
