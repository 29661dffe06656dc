//! Deep merge of configuration documents.
//!
//! Objects merge key by key. Everything else, arrays included, is replaced wholesale by the
//! overriding value.

use serde_json::Value;

/// Merges `overlay` on top of `base`. Recursion only happens when both sides hold an object for
/// the same key, otherwise the overlay value wins at that key.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => {
                        let current = std::mem::take(existing);
                        *existing = deep_merge(current, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merges every layer on top of `base`, lowest priority first.
pub fn merge_layers(base: Value, layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(base, deep_merge)
}
