//! Claves de resolución y anotaciones de valor.
//!
//! Un `TypeKey` identifica un tipo concreto del registro de providers. Dos
//! instanciaciones distintas de un mismo genérico (`Service<i64>` y
//! `Service<f64>`) producen claves distintas porque `TypeId` lo hace. Como
//! `T: ?Sized`, también se pueden usar objetos trait (`dyn Foo`) como alias.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(),
               name: std::any::type_name::<T>() }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Nombre completo (con ruta) del tipo. Es estable entre ejecuciones del
    /// mismo binario, por eso los snapshots lo usan como clave.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Nombre corto, equivalente al nombre de la clase: `a::b::Foo<x::Y>` -> `Foo`.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Recorta la ruta de módulos y los argumentos genéricos de un `type_name`.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    let base = base.trim_start_matches("dyn ");
    let base = match base.find(" + ") {
        Some(idx) => &base[..idx],
        None => base,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

/// Tipo de un valor plano (variables y configuración son JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Int,
            Value::String(_) => ValueKind::Str,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// `true` si `value` es exactamente de este tipo (o el tipo es `Any`).
    /// Un entero no satisface `Float` ni un bool satisface `Int`.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(self, ValueKind::Any) || *self == ValueKind::of(value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Any => "any",
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Array => "list",
            ValueKind::Object => "dict",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[allow(dead_code)]
    struct Generic<T>(T);
    trait Marker {}

    #[test]
    fn generic_instantiations_are_distinct_keys() {
        assert_ne!(TypeKey::of::<Generic<i64>>(), TypeKey::of::<Generic<f64>>());
        assert_eq!(TypeKey::of::<Generic<i64>>(), TypeKey::of::<Generic<i64>>());
    }

    #[test]
    fn short_names_strip_paths_and_generics() {
        assert_eq!(TypeKey::of::<Generic<i64>>().short_name(), "Generic");
        assert_eq!(TypeKey::of::<dyn Marker>().short_name(), "Marker");
        assert_eq!(short_type_name("alloc::string::String"), "String");
    }

    #[test]
    fn value_kinds_are_strict() {
        assert!(ValueKind::Int.accepts(&json!(3)));
        assert!(!ValueKind::Float.accepts(&json!(3)));
        assert!(ValueKind::Float.accepts(&json!(3.5)));
        assert!(!ValueKind::Int.accepts(&json!(true)));
        assert!(ValueKind::Any.accepts(&json!({"a": 1})));
    }
}
