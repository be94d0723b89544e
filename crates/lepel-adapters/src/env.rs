//! Valores por defecto del launcher desde variables de entorno.
//! Convención `LEPEL_OUTPUT_DIR`, `LEPEL_CONFIG`, `LEPEL_CHECKPOINT`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const OUTPUT_DIR_VAR: &str = "LEPEL_OUTPUT_DIR";
pub const CONFIG_VAR: &str = "LEPEL_CONFIG";
pub const CHECKPOINT_VAR: &str = "LEPEL_CHECKPOINT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub output_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub checkpoint: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self { output_dir: non_empty(OUTPUT_DIR_VAR).map(PathBuf::from),
               config_file: non_empty(CONFIG_VAR).map(PathBuf::from),
               checkpoint: non_empty(CHECKPOINT_VAR) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
