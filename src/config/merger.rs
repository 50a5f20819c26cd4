//! Deep merge of structured values.
//!
//! Used in two places: layering settings files (user global, then project)
//! and the `edit-json` action, which merges a patch into an existing file.
//!
//! # Merge Rules
//!
//! - Objects are merged key by key, recursively
//! - Arrays are replaced wholesale (never concatenated)
//! - Scalars in the overlay replace whatever the base holds
//! - Null in the overlay either deletes the key ([`NullPolicy::Delete`]) or is
//!   stored as a value ([`NullPolicy::Keep`])

use serde_json::Value;

/// How a `null` in the overlay is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Null removes the key from the base (settings layering).
    Delete,
    /// Null is an ordinary value (structured file edits).
    Keep,
}

/// Merge `overlay` into `base` in place.
///
/// Key order of `base` is preserved; keys only present in the overlay are
/// appended in overlay order.
pub fn deep_merge(base: &mut Value, overlay: &Value, nulls: NullPolicy) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() && nulls == NullPolicy::Delete {
                    base_map.shift_remove(key);
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value, nulls),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Merge several layers in order (later layers win).
pub fn merge_layers(layers: &[Value], nulls: NullPolicy) -> Value {
    layers
        .iter()
        .fold(Value::Object(Default::default()), |mut acc, layer| {
            if !layer.is_null() {
                deep_merge(&mut acc, layer, nulls);
            }
            acc
        })
}

/// Remove a dot-separated key path (`a.b.c`) from an object tree.
///
/// Returns whether anything was removed. Missing intermediate keys are not
/// an error.
pub fn remove_path(value: &mut Value, path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };

    let mut current = value;
    for segment in segments {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match current.as_object_mut() {
        Some(map) => map.shift_remove(last).is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_key_by_key() {
        let mut base = json!({"a": {"c": 2}});
        deep_merge(&mut base, &json!({"a": {"b": 1}}), NullPolicy::Keep);
        assert_eq!(base, json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let mut base = json!({"files": ["a", "b"]});
        deep_merge(&mut base, &json!({"files": ["c"]}), NullPolicy::Keep);
        assert_eq!(base, json!({"files": ["c"]}));
    }

    #[test]
    fn scalar_conflict_takes_overlay_value() {
        let mut base = json!({"version": "1.0.0", "private": false});
        deep_merge(
            &mut base,
            &json!({"version": "2.0.0", "private": true}),
            NullPolicy::Keep,
        );
        assert_eq!(base["version"], "2.0.0");
        assert_eq!(base["private"], true);
    }

    #[test]
    fn object_replaces_scalar() {
        let mut base = json!({"repository": "org/repo"});
        deep_merge(
            &mut base,
            &json!({"repository": {"type": "git"}}),
            NullPolicy::Keep,
        );
        assert_eq!(base["repository"]["type"], "git");
    }

    #[test]
    fn null_deletes_under_delete_policy() {
        let mut base = json!({"registry": "https://a", "strategy": "ask"});
        deep_merge(&mut base, &json!({"registry": null}), NullPolicy::Delete);
        assert!(base.get("registry").is_none());
        assert_eq!(base["strategy"], "ask");
    }

    #[test]
    fn null_is_stored_under_keep_policy() {
        let mut base = json!({"main": "index.js"});
        deep_merge(&mut base, &json!({"main": null}), NullPolicy::Keep);
        assert!(base["main"].is_null());
    }

    #[test]
    fn merge_preserves_base_key_order() {
        let mut base = json!({"name": "x", "version": "1", "scripts": {}});
        deep_merge(
            &mut base,
            &json!({"license": "MIT", "name": "y"}),
            NullPolicy::Keep,
        );
        let keys: Vec<&String> = base.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "version", "scripts", "license"]);
    }

    #[test]
    fn merge_layers_applies_in_order() {
        let layers = vec![
            json!({"a": 1, "b": 2}),
            Value::Null,
            json!({"b": 3, "c": 4}),
            json!({"c": 5}),
        ];
        let result = merge_layers(&layers, NullPolicy::Delete);
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 5}));
    }

    #[test]
    fn remove_path_removes_nested_key() {
        let mut value = json!({"devDependencies": {"tslint": "5", "eslint": "8"}});
        assert!(remove_path(&mut value, "devDependencies.tslint"));
        assert_eq!(value, json!({"devDependencies": {"eslint": "8"}}));
    }

    #[test]
    fn remove_path_missing_is_noop() {
        let mut value = json!({"a": 1});
        assert!(!remove_path(&mut value, "b.c"));
        assert!(!remove_path(&mut value, "a.b"));
        assert_eq!(value, json!({"a": 1}));
    }
}
