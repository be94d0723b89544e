//! Validación de la configuración contra las propiedades registradas.

use super::registry::{self, ConfigRegistry};
use super::{resolve_config_value, ConfigMap};
use crate::errors::{PipelineError, Result};
use crate::key::ValueKind;

/// Comprueba que cada propiedad registrada se puede resolver en `config` con
/// el tipo esperado. Acumula todos los fallos en un único
/// `PipelineError::ConfigValidation`.
pub fn ensure_required_config_values(config: &ConfigMap, registry: &ConfigRegistry) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for entry in registry.iter() {
        let value = match resolve_config_value(config, &entry.key, Some(&entry.collection_name)) {
            Ok(v) => v,
            Err(_) => {
                errors.push(format!("No config value for {}.{}", entry.collection_name, entry.key));
                continue;
            }
        };

        if let Some(expected) = entry.expected {
            if !expected.accepts(value) {
                errors.push(format!("Type mismatch for {}.{}: expected {}, got {}",
                                    entry.collection_name,
                                    entry.key,
                                    expected.name(),
                                    ValueKind::of(value).name()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::ConfigValidation(errors))
    }
}

/// Variante sobre el registro global.
pub fn ensure_required_global(config: &ConfigMap) -> Result<()> {
    registry::with_global(|r| ensure_required_config_values(config, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigProperty;
    use serde_json::{json, Value};

    fn cfg(v: Value) -> ConfigMap {
        v.as_object().cloned().unwrap_or_default()
    }

    fn registry() -> ConfigRegistry {
        let mut r = ConfigRegistry::new();
        r.register(ConfigProperty::new("a", "C", Some(ValueKind::Int)));
        r.register(ConfigProperty::new("b_renamed", "C", Some(ValueKind::Str)));
        r
    }

    #[test]
    fn good_config_passes() {
        let config = cfg(json!({"C.a": 1, "b_renamed": "ok"}));
        assert!(ensure_required_config_values(&config, &registry()).is_ok());
    }

    #[test]
    fn bad_config_reports_every_problem() {
        let config = cfg(json!({"C.a": "not-int"}));
        let err = ensure_required_config_values(&config, &registry()).unwrap_err();
        match err {
            PipelineError::ConfigValidation(msgs) => {
                assert_eq!(msgs.len(), 2);
                assert!(msgs[0].starts_with("Type mismatch for C.a: expected int, got str"));
                assert_eq!(msgs[1], "No config value for C.b_renamed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn untyped_property_only_needs_presence() {
        let mut r = ConfigRegistry::new();
        r.register(ConfigProperty::new("anything", "C", None));
        assert!(ensure_required_config_values(&cfg(json!({"anything": [1, 2]})), &r).is_ok());
    }

    #[test]
    fn registered_setting_is_validated_globally() {
        let setting = crate::config::ConfigSetting::<i64>::new("GlobalCheck", "seed").registered();
        assert!(registry::all_registered().contains(setting.property()));

        let err = ensure_required_global(&cfg(json!({}))).unwrap_err();
        assert_eq!(err, PipelineError::ConfigValidation(vec!["No config value for GlobalCheck.seed".into()]));
        assert!(ensure_required_global(&cfg(json!({"GlobalCheck": {"seed": 7}}))).is_ok());
    }
}
