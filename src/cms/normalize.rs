//! REST envelope normalization.
//!
//! The CMS's REST API wraps entities as `{ data: { id, attributes } }` and
//! relations as `{ data: ... }`. Newer versions and the internal entity
//! service return flat records. Both shapes are normalized to flat records
//! so the models deserialize from either.

use serde_json::{Map, Value};

/// Strip the top-level response envelope (`data` plus optional `meta`).
pub fn unwrap_data(body: Value) -> Value {
    flatten(body)
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("data") && map.keys().all(|key| key == "data" || key == "meta")
}

/// Recursively lift `attributes` into the record and unwrap relation
/// envelopes.
pub fn flatten(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(flatten).collect()),
        Value::Object(mut map) => {
            if is_envelope(&map) {
                return flatten(map.remove("data").unwrap_or(Value::Null));
            }

            let mut flat = Map::new();
            if let Some(Value::Object(attributes)) = map.remove("attributes") {
                for (key, field) in attributes {
                    flat.insert(key, flatten(field));
                }
            }
            for (key, field) in map {
                flat.insert(key, flatten(field));
            }
            Value::Object(flat)
        }
        other => other,
    }
}
