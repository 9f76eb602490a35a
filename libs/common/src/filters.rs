//! Filter-set encoding between serde structs and URL query strings
//!
//! Filter structs serialize to query pairs with two rules from the API
//! contract: unset or empty values are omitted entirely (the server must see
//! "no constraint", not "match empty"), and multi-valued fields encode as
//! repeated `key[]` pairs. Parsing the resulting query string back yields a
//! filter object equal to the original, modulo numeric coercion for numeric
//! fields.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while encoding or parsing a filter set.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The filter struct could not be serialized into query pairs.
    #[error("filter encoding failed: {0}")]
    Encode(String),

    /// A query string could not be parsed back into the filter type.
    #[error("filter parsing failed: {0}")]
    Parse(String),
}

/// Contract every per-resource filter struct satisfies.
///
/// Implementors must deserialize from a partial object, so every field is
/// expected to be optional (or the struct carries `#[serde(default)]`).
pub trait FilterSet:
    Serialize + DeserializeOwned + std::fmt::Debug + Clone + Default + PartialEq + Send + Sync + 'static
{
    /// The identity filter set used by "clear filters".
    ///
    /// Defaults to [`Default::default`]; resources with a free-text query
    /// override this to retain that query and drop everything else.
    fn cleared(&self) -> Self {
        Self::default()
    }
}

/// Encode a filter struct into query pairs, omitting unset values.
pub fn to_query_pairs<F: Serialize>(filters: &F) -> Result<Vec<(String, String)>, FilterError> {
    let value = serde_json::to_value(filters).map_err(|e| FilterError::Encode(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(FilterError::Encode(
            "filter sets must serialize to an object".to_string(),
        ));
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            Value::Array(items) => {
                for item in &items {
                    if let Some(text) = scalar_text(item) {
                        if !text.is_empty() {
                            pairs.push((format!("{key}[]"), text));
                        }
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    pairs.push((key, text));
                }
            }
        }
    }

    Ok(pairs)
}

/// Encode a filter struct into a percent-encoded query string.
pub fn to_query_string<F: Serialize>(filters: &F) -> Result<String, FilterError> {
    let pairs = to_query_pairs(filters)?;
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    Ok(serializer.finish())
}

/// Parse a query string back into a filter struct.
///
/// Scalar values are coerced to numbers and booleans where they parse as
/// such. When the target type rejects that shape (a free-text field holding
/// a numeric-looking string), the shape is resolved per field, so one
/// field's fallback to a string cannot poison a genuinely numeric field.
pub fn from_query_string<F: DeserializeOwned>(query: &str) -> Result<F, FilterError> {
    let pairs: Vec<(String, String)> =
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();

    let coerced = build_object(&pairs, true);
    if let Ok(parsed) = serde_json::from_value(Value::Object(coerced.clone())) {
        return Ok(parsed);
    }

    // Filter structs deserialize from partial objects, so each field can be
    // probed alone: keep the coerced shape where the target accepts it and
    // fall back to the raw string where it does not.
    let plain = build_object(&pairs, false);
    let mut resolved = Map::new();
    for (key, value) in coerced {
        let probe = Map::from_iter([(key.clone(), value.clone())]);
        if serde_json::from_value::<F>(Value::Object(probe)).is_ok() {
            resolved.insert(key, value);
        } else {
            let fallback = plain.get(&key).cloned().unwrap_or(value);
            resolved.insert(key, fallback);
        }
    }
    serde_json::from_value(Value::Object(resolved)).map_err(|e| FilterError::Parse(e.to_string()))
}

fn build_object(pairs: &[(String, String)], coerce: bool) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, raw) in pairs {
        let value = if coerce {
            coerce_scalar(raw)
        } else {
            Value::String(raw.clone())
        };

        if let Some(name) = key.strip_suffix("[]") {
            let entry = map
                .entry(name.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(value);
            }
        } else {
            map.insert(key.clone(), value);
        }
    }
    map
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}
