//! Errores de los adaptadores de I/O.

use std::path::PathBuf;

use lepel_core::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("Unsupported config file type: {0:?}, supported extensions: .yaml, .yml, .json, .toml")]
    UnsupportedConfigFormat(String),
    #[error("cannot parse config: {0}")]
    ConfigParse(String),
    #[error("Config file must contain a mapping at the top level")]
    NotAMapping,
    #[error("git: {0}")]
    Git(String),
}

impl AdapterError {
    /// Para `map_err`: adjunta la ruta al error de I/O.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<AdapterError> for PipelineError {
    fn from(err: AdapterError) -> Self {
        PipelineError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
