//! Deep merge functionality for site and theme configurations.
//!
//! Mappings merge key by key with the overlay winning. The top-level
//! `plugins` list is the one array that concatenates; every other array is
//! replaced whole.

use crate::types::{Config, PLUGINS_KEY};
use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

/// Merge two configs, with `overlay` taking precedence over `base`.
///
/// `plugins` accumulate: base plugins first, then overlay plugins, with
/// duplicates kept. Everything else follows [`deep_merge`].
///
/// # Example
/// ```
/// use serde_json::json;
/// use theme_graph::config::merge;
/// use theme_graph::types::Config;
///
/// let parent = Config::from_value(json!({
///     "siteMetadata": { "title": "Parent", "author": "A" },
///     "plugins": ["plugin-a"]
/// })).unwrap();
/// let child = Config::from_value(json!({
///     "siteMetadata": { "title": "Child" },
///     "plugins": ["plugin-b"]
/// })).unwrap();
///
/// let merged = merge(&parent, &child);
/// assert_eq!(merged.into_value(), json!({
///     "siteMetadata": { "title": "Child", "author": "A" },
///     "plugins": ["plugin-a", "plugin-b"]
/// }));
/// ```
pub fn merge(base: &Config, overlay: &Config) -> Config {
    let mut merged = base.as_map().clone();

    for (key, overlay_value) in overlay.as_map() {
        let value = match merged.remove(key) {
            Some(base_value) if key == PLUGINS_KEY => {
                concat_plugins(base_value, overlay_value.clone())
            }
            Some(base_value) => deep_merge(base_value, overlay_value.clone()),
            None => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    Config::from(merged)
}

/// Fold configs left to right, seeded with an empty config.
pub fn merge_all<'a>(configs: impl IntoIterator<Item = &'a Config>) -> Config {
    configs
        .into_iter()
        .fold(Config::new(), |acc, next| merge(&acc, next))
}

fn concat_plugins(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Array(mut base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items);
            Value::Array(base_items)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
