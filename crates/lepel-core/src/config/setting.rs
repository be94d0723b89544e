//! `ConfigSetting<T>`: propiedad tipada que lee su valor de la configuración.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::registry::{self, ConfigProperty, ConfigRegistry};
use super::{resolve_config_value, ConfigMap};
use crate::errors::{PipelineError, Result};
use crate::key::ValueKind;

/// Tipos Rust con un `ValueKind` JSON conocido.
pub trait HasValueKind {
    const KIND: ValueKind;
}

macro_rules! value_kind {
    ($kind:expr => $($ty:ty),+) => {
        $(impl HasValueKind for $ty { const KIND: ValueKind = $kind; })+
    };
}

value_kind!(ValueKind::Bool => bool);
value_kind!(ValueKind::Int => i32, i64, u32, u64, usize);
value_kind!(ValueKind::Float => f32, f64);
value_kind!(ValueKind::Str => String);
value_kind!(ValueKind::Object => ConfigMap);
value_kind!(ValueKind::Any => Value);

impl<T> HasValueKind for Vec<T> {
    const KIND: ValueKind = ValueKind::Array;
}

/// Propiedad respaldada por configuración.
///
/// ```ignore
/// let setting = ConfigSetting::<String>::new("BindConfigFromDisk", "config_file").registered();
/// let path = setting.get(&config)?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigSetting<T> {
    property: ConfigProperty,
    _value: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + HasValueKind> ConfigSetting<T> {
    /// Propiedad con comprobación de tipo derivada de `T`.
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self { property: ConfigProperty::new(key, collection, Some(T::KIND)),
               _value: PhantomData }
    }
}

impl<T: DeserializeOwned> ConfigSetting<T> {
    /// Propiedad sin tipo comprobable en validación.
    pub fn untyped(collection: impl Into<String>, key: impl Into<String>) -> Self {
        let property = ConfigProperty::new(key, collection, None);
        log::warn!("Property \"{}.{}\" cannot be type checked because it does not declare a value kind",
                   property.collection_name,
                   property.key);
        Self { property,
               _value: PhantomData }
    }

    pub fn property(&self) -> &ConfigProperty {
        &self.property
    }

    /// Registra la propiedad en el registro global y se devuelve a sí misma.
    pub fn registered(self) -> Self {
        registry::register(self.property.clone());
        self
    }

    pub fn register_into(&self, registry: &mut ConfigRegistry) {
        registry.register(self.property.clone());
    }

    /// Lee el valor usando la colección con la que se declaró.
    pub fn get(&self, config: &ConfigMap) -> Result<T> {
        self.get_for(&self.property.collection_name, config)
    }

    /// Lee el valor con otro ámbito (p.ej. el nombre de un tipo que reutiliza la propiedad).
    pub fn get_for(&self, collection: &str, config: &ConfigMap) -> Result<T> {
        let value = resolve_config_value(config, &self.property.key, Some(collection))?;
        serde_json::from_value(value.clone()).map_err(|e| PipelineError::TypeMismatch { name: format!("{collection}.{}", self.property.key),
                                                                                         expected: std::any::type_name::<T>().to_string(),
                                                                                         found: e.to_string() })
    }
}
