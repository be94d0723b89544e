//! Conversión de tokens de línea de comandos a configuración.
//!
//! Formas aceptadas: `--key value`, `--key=value` y `--flag` (true). Un token
//! siguiente que empieza por `-` nunca se consume como valor y los tokens que
//! no empiezan por `--` se ignoran.

use lepel_core::ConfigMap;
use serde_json::{Number, Value};

pub fn cli_args_to_config<I, S>(tokens: I) -> ConfigMap
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    let tokens: Vec<S> = tokens.into_iter().collect();
    let mut parsed = ConfigMap::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_ref();
        let Some(key_val) = token.strip_prefix("--") else {
            i += 1;
            continue;
        };

        let (key, raw) = match key_val.split_once('=') {
            Some((key, raw)) => (key, Some(raw)),
            None => match tokens.get(i + 1).map(AsRef::as_ref) {
                Some(next) if !next.starts_with('-') => {
                    i += 1;
                    (key_val, Some(next))
                }
                _ => (key_val, None),
            },
        };

        parsed.insert(key.to_string(), convert_value(raw));
        i += 1;
    }

    parsed
}

/// bool -> entero (i64, luego u64) -> float -> string (sin comillas envolventes).
fn convert_value(raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Bool(true);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Value::from(n);
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }

    Value::String(strip_quotes(raw).to_string())
}

fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_token_forms() {
        let config = cli_args_to_config(["--a", "1", "--b.c", "2.0", "--d=3", "--e=False", "--f=\"foo\"", "not", "parsed",
                                         "--flag", "--flag2"]);
        assert_eq!(Value::Object(config),
                   json!({"a": 1, "b.c": 2.0, "d": 3, "e": false, "f": "foo", "flag": true, "flag2": true}));
    }

    #[test]
    fn dash_prefixed_token_is_not_a_value() {
        let config = cli_args_to_config(["--verbose", "-x", "--n", "-3"]);
        assert_eq!(config.get("verbose"), Some(&json!(true)));
        assert_eq!(config.get("n"), Some(&json!(true)));
        assert!(!config.contains_key("x"));
    }

    #[test]
    fn equals_form_keeps_negative_numbers_and_later_equals() {
        let config = cli_args_to_config(["--n=-3", "--expr=a=b", "--name='x y'"]);
        assert_eq!(config.get("n"), Some(&json!(-3)));
        assert_eq!(config.get("expr"), Some(&json!("a=b")));
        assert_eq!(config.get("name"), Some(&json!("x y")));
    }

    #[test]
    fn integers_above_i64_keep_precision() {
        let config = cli_args_to_config(["--seed", "18446744073709551615"]);
        assert_eq!(config.get("seed"), Some(&json!(u64::MAX)));
        assert!(config.get("seed").is_some_and(Value::is_u64));
    }

    #[test]
    fn non_finite_floats_stay_strings() {
        let config = cli_args_to_config(["--x", "nan"]);
        assert_eq!(config.get("x"), Some(&json!("nan")));
    }
}
