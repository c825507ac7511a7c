//! Tool settings types.

use serde::{Deserialize, Serialize};

/// Default base name of a theme or site config file (without extension).
pub const DEFAULT_CONFIG_NAME: &str = "site-config";

/// Name the plugin loader gives the implicit site plugin.
pub const DEFAULT_SITE_PLUGIN: &str = "default-site-plugin";

/// Settings that steer package lookup and config discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base name of config files, e.g. `site-config` for `site-config.yaml`.
    #[serde(default = "default_config_name")]
    pub config_name: String,

    /// Directories (relative to the site root) searched for packages, in order.
    #[serde(default = "default_package_dirs")]
    pub package_dirs: Vec<String>,

    /// Name of the implicit plugin representing the site itself.
    #[serde(default = "default_site_plugin")]
    pub default_site_plugin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_name: default_config_name(),
            package_dirs: default_package_dirs(),
            default_site_plugin: default_site_plugin(),
        }
    }
}

fn default_config_name() -> String {
    DEFAULT_CONFIG_NAME.to_string()
}

fn default_package_dirs() -> Vec<String> {
    vec!["plugins".to_string(), "node_modules".to_string()]
}

fn default_site_plugin() -> String {
    DEFAULT_SITE_PLUGIN.to_string()
}
