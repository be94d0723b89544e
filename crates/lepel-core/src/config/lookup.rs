//! Búsquedas de valores en el mapa de configuración.

use serde_json::Value;

use super::ConfigMap;
use crate::errors::{PipelineError, Result};

/// Búsqueda usada por el resolver para un parámetro `name`.
///
/// Con un dueño (nombre corto del step o tipo que declara el parámetro) se
/// prueba la clave plana `"{owner}.{name}"` y después la anidada
/// `config[owner][name]`. Si nada coincide se usa `name` tal cual. La clave
/// plana siempre gana a la anidada.
pub fn lookup_scoped<'a>(config: &'a ConfigMap, name: &str, owner: Option<&str>) -> Option<&'a Value> {
    if let Some(owner) = owner {
        if let Some(v) = config.get(&format!("{owner}.{name}")) {
            return Some(v);
        }
        if let Some(Value::Object(nested)) = config.get(owner) {
            if let Some(v) = nested.get(name) {
                return Some(v);
            }
        }
    }
    config.get(name)
}

/// Resolución de claves de propiedades de configuración.
///
/// Orden (primera coincidencia):
/// 1. `"{collection}.{key}"`, resuelto recursivamente con estas mismas reglas.
/// 2. `key` como clave plana.
/// 3. `key` con puntos como ruta anidada: `a.b.c` -> `config["a"]` y luego `b.c`.
pub fn resolve_config_value<'a>(config: &'a ConfigMap, key: &str, collection: Option<&str>) -> Result<&'a Value> {
    if let Some(collection) = collection {
        if let Ok(v) = resolve_config_value(config, &format!("{collection}.{key}"), None) {
            return Ok(v);
        }
    }

    if let Some(v) = config.get(key) {
        return Ok(v);
    }

    if let Some((head, rest)) = key.split_once('.') {
        if let Some(Value::Object(inner)) = config.get(head) {
            return resolve_config_value(inner, rest, None).map_err(|_| PipelineError::lookup(key));
        }
    }

    Err(PipelineError::lookup(key))
}
