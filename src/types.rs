//! Core types for theme resolution.

use crate::error::{ThemeError, ThemeResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Reserved config key holding the ordered plugin list.
pub const PLUGINS_KEY: &str = "plugins";

/// Reserved config key naming parent themes.
pub const THEMES_KEY: &str = "__experimentalThemes";

/// Options passed to a plugin or theme.
pub type Options = Map<String, Value>;

/// A plugin reference: a bare package name or `{ resolve, options }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    Name(String),
    Resolve {
        resolve: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Options>,
    },
}

/// Themes are referenced exactly like plugins.
pub type ThemeSpec = PluginSpec;

impl PluginSpec {
    /// Shorthand for `{ resolve, options }`.
    pub fn with_options(resolve: impl Into<String>, options: Options) -> Self {
        PluginSpec::Resolve {
            resolve: resolve.into(),
            options: Some(options),
        }
    }

    /// The package name this spec refers to.
    pub fn name(&self) -> &str {
        match self {
            PluginSpec::Name(name) => name,
            PluginSpec::Resolve { resolve, .. } => resolve,
        }
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            PluginSpec::Name(_) => None,
            PluginSpec::Resolve { options, .. } => options.as_ref(),
        }
    }

    /// Declared options, or an empty mapping.
    pub fn options_or_empty(&self) -> Options {
        self.options().cloned().unwrap_or_default()
    }

    /// Parse a raw config entry. `context` names the list it came from.
    pub fn from_value(value: &Value, context: &str) -> ThemeResult<Self> {
        serde_json::from_value(value.clone()).map_err(|_| {
            ThemeError::invalid(
                context,
                format!(
                    "expected a package name or {{ resolve, options }}, got {}",
                    value
                ),
            )
        })
    }
}

impl From<&str> for PluginSpec {
    fn from(name: &str) -> Self {
        PluginSpec::Name(name.to_string())
    }
}

impl fmt::Display for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A site or theme configuration.
///
/// Only `plugins` and `__experimentalThemes` have meaning here; every other
/// key is opaque user data carried through merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(Map<String, Value>);

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from a JSON value. `null` is treated as an empty config.
    pub fn from_value(value: Value) -> ThemeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ThemeError::invalid(
                "config",
                format!("expected a mapping, got {}", other),
            )),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw `plugins` entries, untouched. Absent or null means none.
    pub fn plugin_values(&self) -> ThemeResult<Vec<Value>> {
        list_values(self.get(PLUGINS_KEY), PLUGINS_KEY)
    }

    /// Parsed `plugins` entries in declaration order.
    pub fn plugins(&self) -> ThemeResult<Vec<PluginSpec>> {
        self.plugin_values()?
            .iter()
            .map(|v| PluginSpec::from_value(v, PLUGINS_KEY))
            .collect()
    }

    /// Parent themes declared under `__experimentalThemes`.
    pub fn parent_themes(&self) -> ThemeResult<Vec<ThemeSpec>> {
        list_values(self.get(THEMES_KEY), THEMES_KEY)?
            .iter()
            .map(|v| PluginSpec::from_value(v, THEMES_KEY))
            .collect()
    }
}

impl From<Map<String, Value>> for Config {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn list_values(value: Option<&Value>, context: &str) -> ThemeResult<Vec<Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(ThemeError::invalid(
            context,
            format!("expected a list, got {}", other),
        )),
    }
}

/// Function form of a theme configuration.
pub type ConfigFactory = Arc<dyn Fn(&Options) -> ThemeResult<Config> + Send + Sync>;

/// What a theme package exports: a plain config or a function of its options.
#[derive(Clone)]
pub enum ThemeConfig {
    Static(Config),
    Factory(ConfigFactory),
}

impl ThemeConfig {
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&Options) -> ThemeResult<Config> + Send + Sync + 'static,
    {
        ThemeConfig::Factory(Arc::new(f))
    }

    /// Produce the effective config for the given options.
    pub fn resolve(&self, options: &Options) -> ThemeResult<Config> {
        match self {
            ThemeConfig::Static(config) => Ok(config.clone()),
            ThemeConfig::Factory(factory) => factory(options),
        }
    }
}

impl fmt::Debug for ThemeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeConfig::Static(config) => f.debug_tuple("Static").field(config).finish(),
            ThemeConfig::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// A theme whose package and configuration have been located.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTheme {
    pub name: String,
    /// `None` when the theme ships no config file.
    pub config: Option<Config>,
    pub spec: ThemeSpec,
    pub dir: PathBuf,
}

impl ResolvedTheme {
    /// Parent themes this theme declares, in order.
    pub fn parents(&self) -> ThemeResult<Vec<ThemeSpec>> {
        match &self.config {
            Some(config) => config.parent_themes(),
            None => Ok(Vec::new()),
        }
    }

    /// The theme's config with the theme itself appended as its last plugin,
    /// so its own hooks run after the plugins it declares.
    pub fn as_plugin_config(&self) -> ThemeResult<Config> {
        let mut config = self.config.clone().unwrap_or_default();
        let mut plugins = config.plugin_values()?;
        plugins.push(json!({
            "resolve": self.name,
            "options": self.spec.options_or_empty(),
        }));
        config.insert(PLUGINS_KEY, Value::Array(plugins));
        Ok(config)
    }
}

/// A plugin as reported by the plugin loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedPlugin {
    pub name: String,
    /// Resolved package directory.
    pub resolve: PathBuf,
    pub options: Options,
}

/// Outcome of a theme pass: the merged config and the flattened themes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeLoadResult {
    pub config: Config,
    pub themes: Vec<ResolvedTheme>,
}
