//! Steps incluidos: volcado de flags de CLI a configuración, carga de un
//! fichero de configuración y validación de propiedades registradas.

pub mod bind_config;
pub mod ensure_required;
pub mod register_cli_args;

pub use bind_config::BindConfigFromDisk;
pub use ensure_required::EnsureRequiredConfigValues;
pub use register_cli_args::RegisterCliArgsToConfig;

/// Registra en el registro global las propiedades de los steps incluidos.
/// Idempotente.
pub fn register_builtin_settings() {
    bind_config::register_settings();
}
