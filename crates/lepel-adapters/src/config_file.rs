//! Lectura/escritura de la configuración en disco (JSON, YAML o TOML).

use std::fs;
use std::path::Path;

use lepel_core::ConfigMap;
use serde_json::Value;

use crate::error::{AdapterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Formato según la extensión (sin distinguir mayúsculas).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension()
                      .and_then(|e| e.to_str())
                      .map(|e| e.to_ascii_lowercase())
                      .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(AdapterError::UnsupportedConfigFormat(format!(".{ext}"))),
        }
    }

    pub fn parse(&self, text: &str) -> Result<ConfigMap> {
        let value: Value = match self {
            Self::Json => serde_json::from_str(text).map_err(|e| AdapterError::ConfigParse(e.to_string()))?,
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| AdapterError::ConfigParse(e.to_string()))?,
            Self::Toml => toml::from_str(text).map_err(|e| AdapterError::ConfigParse(e.to_string()))?,
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(AdapterError::NotAMapping),
        }
    }

    pub fn render(&self, config: &ConfigMap) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(config).map_err(|e| AdapterError::ConfigParse(e.to_string())),
            Self::Yaml => serde_yaml::to_string(config).map_err(|e| AdapterError::ConfigParse(e.to_string())),
            Self::Toml => toml::to_string(config).map_err(|e| AdapterError::ConfigParse(e.to_string())),
        }
    }
}

pub fn load_config(path: &Path) -> Result<ConfigMap> {
    if !path.exists() {
        return Err(AdapterError::ConfigNotFound(path.to_path_buf()));
    }
    let format = ConfigFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(AdapterError::io(path))?;
    format.parse(&text)
}

/// Escribe `config` en el formato que indica la extensión de `path`, creando
/// el directorio padre si hace falta.
pub fn save_config(config: &ConfigMap, path: &Path) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(AdapterError::io(parent))?;
    }
    let text = format.render(config)?;
    fs::write(path, text).map_err(AdapterError::io(path))
}
