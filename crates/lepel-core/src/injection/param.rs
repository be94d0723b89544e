//! Parámetros declarados.
//!
//! En lugar de inspeccionar firmas en tiempo de ejecución, cada factory y
//! cada step declara la lista de parámetros que necesita: nombre, anotación
//! y valor por defecto opcional.

use serde_json::Value;

use crate::config::HasValueKind;
use crate::key::{TypeKey, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// Cualquier valor encontrado por nombre.
    Untyped,
    /// Un valor plano (variable o configuración) de un tipo JSON concreto.
    Value(ValueKind),
    /// Una instancia del registro de providers.
    Provided(TypeKey),
}

impl Annotation {
    /// `true` si un valor encontrado por nombre satisface la anotación.
    /// Los valores por nombre son JSON y nunca satisfacen `Provided`.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }
        match self {
            Annotation::Untyped => true,
            Annotation::Value(kind) => kind.accepts(value),
            Annotation::Provided(_) => false,
        }
    }

    pub fn key(&self) -> Option<TypeKey> {
        match self {
            Annotation::Provided(key) => Some(*key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Annotation,
    pub default: Option<Value>,
}

impl Param {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               annotation: Annotation::Untyped,
               default: None }
    }

    pub fn value(name: impl Into<String>, kind: ValueKind) -> Self {
        Self { name: name.into(),
               annotation: Annotation::Value(kind),
               default: None }
    }

    /// Parámetro de valor cuyo tipo JSON se deriva de `T`.
    pub fn of<T: HasValueKind>(name: impl Into<String>) -> Self {
        Self::value(name, T::KIND)
    }

    /// Parámetro que se resuelve por tipo en el registro.
    pub fn provided<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               annotation: Annotation::Provided(TypeKey::of::<T>()),
               default: None }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}
