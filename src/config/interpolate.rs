//! `${options.key}` placeholders in theme config files.
//!
//! A config file that references its options becomes a factory: the
//! placeholders are filled in from the options given where the theme is
//! declared. A value that is a single placeholder keeps the option's type;
//! placeholders inside longer strings are interpolated as text.
//! `${options.key:-fallback}` supplies a fallback string.

use crate::error::{ThemeError, ThemeResult};
use crate::types::{Config, Options, ThemeConfig};
use regex_lite::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{options\.([A-Za-z0-9_.-]+)(?::-([^}]*))?\}").expect("placeholder regex")
});

static WHOLE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{options\.([A-Za-z0-9_.-]+)(?::-([^}]*))?\}$").expect("placeholder regex")
});

/// Whether any string in `value` references an option.
pub fn has_placeholders(value: &Value) -> bool {
    match value {
        Value::String(s) => PLACEHOLDER.is_match(s),
        Value::Array(items) => items.iter().any(has_placeholders),
        Value::Object(map) => map.values().any(has_placeholders),
        _ => false,
    }
}

/// Turn a parsed config document into a static config or a factory.
///
/// `theme` names the package in errors raised when the factory runs.
pub fn theme_config_from_value(value: Value, theme: &str) -> ThemeResult<ThemeConfig> {
    if !has_placeholders(&value) {
        return Ok(ThemeConfig::Static(Config::from_value(value)?));
    }

    // Validate the shape now so a bad document fails at load time.
    if !matches!(value, Value::Object(_)) {
        Config::from_value(value.clone())?;
    }

    let theme = theme.to_string();
    Ok(ThemeConfig::factory(move |options| {
        Config::from_value(interpolate(&value, options, &theme)?)
    }))
}

/// Fill every placeholder in `value` from `options`.
pub fn interpolate(value: &Value, options: &Options, theme: &str) -> ThemeResult<Value> {
    match value {
        Value::String(s) => interpolate_str(s, options, theme),
        Value::Array(items) => items
            .iter()
            .map(|item| interpolate(item, options, theme))
            .collect::<ThemeResult<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map {
                out.insert(key.clone(), interpolate(item, options, theme)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn interpolate_str(s: &str, options: &Options, theme: &str) -> ThemeResult<Value> {
    if let Some(caps) = WHOLE_PLACEHOLDER.captures(s) {
        return resolve(&caps, options, theme);
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&s[last..whole.start()]);
        match resolve(&caps, options, theme)? {
            Value::String(text) => out.push_str(&text),
            other => out.push_str(&other.to_string()),
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(Value::String(out))
}

fn resolve(caps: &Captures<'_>, options: &Options, theme: &str) -> ThemeResult<Value> {
    let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    if let Some(value) = lookup(options, key) {
        return Ok(value.clone());
    }
    match caps.get(2) {
        Some(fallback) => Ok(Value::String(fallback.as_str().to_string())),
        None => Err(ThemeError::MissingOption {
            theme: theme.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Walk a dotted key through nested option mappings. Null counts as unset.
fn lookup<'a>(options: &'a Options, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = options.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    (!current.is_null()).then_some(current)
}
