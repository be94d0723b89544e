use std::path::PathBuf;

use lepel_core::config::merge_config;
use lepel_core::injection::{Args, DependencyManager};
use lepel_core::{ConfigSetting, PipelineStep, Result};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::config_file::load_config;

// Se añade al registro global la primera vez que se usa.
static CONFIG_FILE: Lazy<ConfigSetting<String>> =
    Lazy::new(|| ConfigSetting::new("BindConfigFromDisk", "config_file").registered());

pub(crate) fn register_settings() {
    Lazy::force(&CONFIG_FILE);
}

/// Carga el fichero indicado por la propiedad `BindConfigFromDisk.config_file`
/// (o `config_file`) y lo fusiona en la configuración y en las variables.
#[derive(Debug, Clone)]
pub struct BindConfigFromDisk {
    config_file: ConfigSetting<String>,
}

impl BindConfigFromDisk {
    pub fn new() -> Self {
        Self { config_file: CONFIG_FILE.clone() }
    }

    pub fn setting(&self) -> &ConfigSetting<String> {
        &self.config_file
    }
}

impl Default for BindConfigFromDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for BindConfigFromDisk {
    fn run(&mut self, _args: &Args, deps: &mut DependencyManager) -> Result<Value> {
        let path = PathBuf::from(self.config_file.get(deps.config())?);
        let loaded = load_config(&path)?;

        merge_config(deps.config_mut(), &loaded);
        deps.update_variables(loaded.into_iter());
        Ok(Value::Null)
    }
}
