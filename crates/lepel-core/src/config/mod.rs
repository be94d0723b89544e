//! Mapeo de configuración y propiedades respaldadas por configuración.
//!
//! La configuración es un mapa JSON anidado que produce un adaptador externo
//! (fichero JSON/YAML/TOML, flags de CLI). El núcleo sólo la consulta:
//! - `lookup`: búsquedas por nombre que usa el resolver y la resolución de
//!   claves de propiedades (`resolve_config_value`).
//! - `registry`: metadatos de las propiedades declaradas.
//! - `setting`: `ConfigSetting<T>`, la propiedad tipada.
//! - `validation`: verificación de que todas las propiedades registradas existen
//!   y tienen el tipo esperado.

pub mod lookup;
pub mod registry;
pub mod setting;
pub mod validation;

pub use lookup::{lookup_scoped, resolve_config_value};
pub use registry::{ConfigProperty, ConfigRegistry};
pub use setting::{ConfigSetting, HasValueKind};
pub use validation::{ensure_required_config_values, ensure_required_global};

/// Mapa de configuración (clave -> valor JSON, posiblemente anidado).
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Fusión superficial: las claves de `overrides` reemplazan a las de `base`.
pub fn merge_config(base: &mut ConfigMap, overrides: &ConfigMap) {
    for (k, v) in overrides.iter() {
        base.insert(k.clone(), v.clone());
    }
}
