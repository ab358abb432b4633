use serde_json::Value;

/// Canonicalize JSON by sorting all object keys recursively and emitting
/// compact JSON, so downstream hashing/equality and embedded metadata blocks
/// are byte-stable. `canonicalize` is a fixed point: re-canonicalizing
/// already-canonical JSON returns the same bytes.
pub fn to_canonical_string(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("canonical json serialization must not fail")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_nested_keys() {
        let v = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(to_canonical_string(&v), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn is_a_fixed_point() {
        let v = json!({"z": [3, 2, 1], "a": 1});
        let once = to_canonical_string(&v);
        let twice = to_canonical_string(&serde_json::from_str(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn round_trips_as_a_value() {
        let v = json!({"points": 52, "ast": 4, "nested": {"x": true, "y": null}});
        let canonical = to_canonical_string(&v);
        let back: Value = serde_json::from_str(&canonical).unwrap();
        assert_eq!(back, v);
    }
}
