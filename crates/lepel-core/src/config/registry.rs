//! Registro de propiedades respaldadas por configuración.
//!
//! Cada `ConfigProperty` describe una clave que una "colección" (normalmente
//! el nombre corto de un step o servicio) lee de la configuración. El registro
//! permite validar la configuración completa antes de ejecutar nada, sin
//! instanciar los tipos que declaran las propiedades.

use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::key::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigProperty {
    /// Clave buscada en la configuración (puede diferir del nombre del campo).
    pub key: String,
    /// Ámbito de la clave, p.ej. `"BindConfigFromDisk"`.
    pub collection_name: String,
    /// Tipo esperado; `None` desactiva la comprobación de tipo.
    pub expected: Option<ValueKind>,
}

impl ConfigProperty {
    pub fn new(key: impl Into<String>, collection_name: impl Into<String>, expected: Option<ValueKind>) -> Self {
        Self { key: key.into(),
               collection_name: collection_name.into(),
               expected }
    }
}

/// Lista ordenada de propiedades. No comprueba duplicados.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    entries: Vec<ConfigProperty>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: ConfigProperty) {
        self.entries.push(entry);
    }

    /// Copia de las entradas; mutarla no afecta al registro.
    pub fn all_registered(&self) -> Vec<ConfigProperty> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigProperty> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// Registro de proceso, análogo al registro que llenan los `ConfigSetting` al declararse.
static GLOBAL_REGISTRY: Lazy<Mutex<ConfigRegistry>> = Lazy::new(|| Mutex::new(ConfigRegistry::new()));

/// Ejecuta `f` con el registro global bloqueado.
pub fn with_global<R>(f: impl FnOnce(&mut ConfigRegistry) -> R) -> R {
    let mut guard = GLOBAL_REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

pub fn register(entry: ConfigProperty) {
    with_global(|r| r.register(entry));
}

pub fn all_registered() -> Vec<ConfigProperty> {
    with_global(|r| r.all_registered())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_copy_out() {
        let mut registry = ConfigRegistry::new();
        let entry = ConfigProperty::new("x", "A", Some(ValueKind::Int));
        registry.register(entry.clone());

        let mut regs = registry.all_registered();
        assert_eq!(regs, vec![entry]);
        regs.clear();
        assert_eq!(registry.len(), 1);
    }
}
