//! Bolsa de variables de ejecución.
//!
//! Mapa mutable y ordenado `nombre -> valor` con los datos que aparecen
//! mientras corre el pipeline (paso actual, directorio de salida, resultados
//! registrados). Los valores son JSON para que el snapshot pueda persistirlos
//! sin conocer sus tipos.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PipelineError, Result};

/// Nombre del step en ejecución.
pub const PIPELINE_STEP: &str = "pipeline_step";
/// Lista (JSON array) con el resultado de cada step regular, en orden.
pub const PIPELINE_RESULTS: &str = "pipeline_results";
/// Identificador de la ejecución actual.
pub const RUN_ID: &str = "run_id";
/// Directorio de salida, si el launcher lo fija.
pub const OUTPUT_DIR: &str = "output_dir";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    inner: IndexMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lectura estricta: un nombre ausente es un error.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.inner.get(name).ok_or_else(|| PipelineError::lookup(name))
    }

    pub fn get_opt(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Lee y deserializa una variable.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.get(name)?;
        serde_json::from_value(value.clone()).map_err(|e| PipelineError::TypeMismatch { name: name.to_string(),
                                                                                         expected: std::any::type_name::<T>().to_string(),
                                                                                         found: e.to_string() })
    }

    /// Inserta o reemplaza. Un reemplazo conserva la posición original.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Como `set` pero serializando un valor arbitrario.
    pub fn set_serialized<T: Serialize>(&mut self, name: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| PipelineError::Internal(e.to_string()))?;
        self.set(name, value);
        Ok(())
    }

    /// Borra un nombre; si no existe es un error (igual que leerlo).
    pub fn remove(&mut self, name: &str) -> Result<Value> {
        self.inner.shift_remove(name).ok_or_else(|| PipelineError::lookup(name))
    }

    /// Devuelve el valor existente o inserta `default`.
    pub fn set_default(&mut self, name: impl Into<String>, default: impl Into<Value>) -> &Value {
        self.inner.entry(name.into()).or_insert_with(|| default.into())
    }

    /// Extrae el último par insertado.
    pub fn pop_last(&mut self) -> Option<(String, Value)> {
        self.inner.pop()
    }

    pub fn update<I, K>(&mut self, entries: I)
        where I: IntoIterator<Item = (K, Value)>,
              K: Into<String>
    {
        for (k, v) in entries {
            self.set(k, v);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.inner.values()
    }

    /// Nombre del step actual, si el sequencer ya arrancó.
    pub fn pipeline_step(&self) -> Option<&str> {
        self.inner.get(PIPELINE_STEP).and_then(|v| v.as_str())
    }

    /// Resultados registrados hasta ahora (vacío si no hay ninguno).
    pub fn results(&self) -> &[Value] {
        match self.inner.get(PIPELINE_RESULTS) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn push_result(&mut self, result: Value) {
        let slot = self.inner
                       .entry(PIPELINE_RESULTS.to_string())
                       .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(result),
            other => *other = Value::Array(vec![result]),
        }
    }
}

impl From<IndexMap<String, Value>> for Variables {
    fn from(inner: IndexMap<String, Value>) -> Self {
        Self { inner }
    }
}

impl FromIterator<(String, Value)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Variables {
        [("a".to_string(), json!(1)), ("b".to_string(), json!(2))].into_iter().collect()
    }

    #[test]
    fn get_set_and_iterate_in_insertion_order() {
        let mut vars = sample();
        vars.set("c", json!("x"));
        vars.set("a", json!(10));
        let keys: Vec<&String> = vars.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(vars.get("a").unwrap(), &json!(10));
        assert_eq!(vars.get_as::<String>("c").unwrap(), "x");
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn missing_name_is_an_error_for_read_and_delete() {
        let mut vars = Variables::new();
        assert!(matches!(vars.get("nope"), Err(PipelineError::Lookup { .. })));
        assert!(matches!(vars.remove("nope"), Err(PipelineError::Lookup { .. })));
    }

    #[test]
    fn remove_deletes_the_entry() {
        let mut vars = sample();
        assert_eq!(vars.remove("a").unwrap(), json!(1));
        assert!(!vars.contains("a"));
        assert!(vars.get_opt("a").is_none());
    }

    #[test]
    fn set_default_and_pop() {
        let mut vars = sample();
        assert_eq!(vars.set_default("d", 4), &json!(4));
        assert_eq!(vars.set_default("a", 10), &json!(1));
        assert_eq!(vars.pop_last(), Some(("d".to_string(), json!(4))));
        vars.clear();
        assert!(vars.is_empty());
    }

    #[test]
    fn wrong_type_is_reported() {
        let vars = sample();
        assert!(matches!(vars.get_as::<String>("a"), Err(PipelineError::TypeMismatch { .. })));
    }

    #[test]
    fn results_accumulate() {
        let mut vars = Variables::new();
        assert!(vars.results().is_empty());
        vars.push_result(json!(1));
        vars.push_result(Value::Null);
        assert_eq!(vars.results(), &[json!(1), Value::Null]);
    }
}
