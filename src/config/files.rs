//! Config file discovery and parsing inside package directories.
//!
//! A package directory holds at most one effective config file, named
//! `<config_name>.<ext>`. Extensions are tried in [`CONFIG_EXTENSIONS`]
//! order and the first file found wins.

use super::interpolate::theme_config_from_value;
use crate::error::{ThemeError, ThemeResult};
use crate::types::ThemeConfig;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Supported config file extensions, in lookup order.
pub const CONFIG_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Find the config file in `dir`, if any.
///
/// Only "not found" counts as absent; other metadata failures are errors.
pub async fn find_config_file(dir: &Path, config_name: &str) -> ThemeResult<Option<PathBuf>> {
    for ext in CONFIG_EXTENSIONS {
        let path = dir.join(format!("{config_name}.{ext}"));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => return Ok(Some(path)),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ThemeError::io(path, e)),
        }
    }
    Ok(None)
}

/// Read and parse a config file into a static config or a factory.
pub async fn read_config_file(path: &Path, theme: &str) -> ThemeResult<ThemeConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ThemeError::io(path, e))?;
    let value = parse_document(path, &content)?;
    theme_config_from_value(prefer_default(value), theme)
}

/// Parse file content by extension: `.json` as JSON, anything else as YAML.
pub fn parse_document(path: &Path, content: &str) -> ThemeResult<Value> {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let parsed = if is_json {
        serde_json::from_str::<Value>(content).map_err(|e| e.to_string())
    } else if content.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| ThemeError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Unwrap a document whose only key is `default` holding a mapping.
pub fn prefer_default(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.len() == 1 && map.get("default").is_some_and(Value::is_object) =>
        {
            map.remove("default").unwrap_or(Value::Null)
        }
        other => other,
    }
}
