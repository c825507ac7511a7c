//! Settings loader with tier-based merging.
//!
//! Loads tool settings from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Settings;
use crate::error::{ThemeError, ThemeResult};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project and per-user settings directory.
pub const SETTINGS_DIR: &str = ".theme-graph";

/// Settings file name inside a settings directory.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level settings (<root>/.theme-graph/)
    Project = 1,
    /// User-level settings (~/.theme-graph/)
    User = 2,
    /// Explicit settings file from THEME_GRAPH_SETTINGS_PATH
    Explicit = 3,
    /// Environment variables (highest priority)
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// A tier that contributed to the effective settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSource {
    pub tier: ConfigTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Locations of each settings tier.
#[derive(Debug, Clone)]
pub struct SettingsPaths {
    /// Project-level settings directory
    pub project_dir: Option<PathBuf>,
    /// User-level settings directory
    pub user_dir: Option<PathBuf>,
    /// Explicit settings file replacing the project and user tiers
    pub explicit_file: Option<PathBuf>,
}

impl SettingsPaths {
    /// Discover settings paths for a site root from environment and defaults.
    pub fn discover(root_dir: &Path) -> Self {
        // User dir: THEME_GRAPH_USER_DIR or ~/.theme-graph
        let user_dir = std::env::var("THEME_GRAPH_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(SETTINGS_DIR)));

        let explicit_file = std::env::var("THEME_GRAPH_SETTINGS_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            project_dir: Some(root_dir.join(SETTINGS_DIR)),
            user_dir,
            explicit_file,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }
}

/// Loads [`Settings`] across tiers.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    pub paths: SettingsPaths,
    settings: Settings,
    sources: Vec<SettingsSource>,
}

impl SettingsLoader {
    /// Load settings for a site root from all tiers.
    pub fn load(root_dir: &Path) -> ThemeResult<Self> {
        Self::load_with_env(SettingsPaths::discover(root_dir), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load settings with explicit paths, reading the process environment.
    pub fn load_with_paths(paths: SettingsPaths) -> ThemeResult<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load settings with explicit paths and an environment lookup.
    pub fn load_with_env(
        paths: SettingsPaths,
        env: impl Fn(&str) -> Option<String>,
    ) -> ThemeResult<Self> {
        let mut layers: Vec<Value> = Vec::new();
        let mut sources = vec![SettingsSource {
            tier: ConfigTier::Defaults,
            path: None,
        }];

        let defaults = serde_json::to_value(Settings::default())
            .map_err(|e| ThemeError::Settings(e.to_string()))?;
        layers.push(defaults);

        if let Some(ref file) = paths.explicit_file {
            layers.push(read_settings_file(file)?);
            sources.push(SettingsSource {
                tier: ConfigTier::Explicit,
                path: Some(file.clone()),
            });
        } else {
            let tiers = [
                (ConfigTier::Project, paths.project_dir.as_ref()),
                (ConfigTier::User, paths.user_dir.as_ref()),
            ];
            for (tier, dir) in tiers {
                let Some(dir) = dir else { continue };
                let file = dir.join(SETTINGS_FILE);
                if file.is_file() {
                    debug!(tier = %tier, path = %file.display(), "Loading settings tier");
                    layers.push(read_settings_file(&file)?);
                    sources.push(SettingsSource {
                        tier,
                        path: Some(file),
                    });
                }
            }
        }

        let merged = deep_merge_all(layers);
        let mut settings: Settings =
            serde_json::from_value(merged).map_err(|e| ThemeError::Settings(e.to_string()))?;

        if Self::apply_env_overrides(&mut settings, env) {
            sources.push(SettingsSource {
                tier: ConfigTier::Environment,
                path: None,
            });
        }

        Ok(Self {
            paths,
            settings,
            sources,
        })
    }

    /// Apply environment variable overrides. Returns true if any applied.
    fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) -> bool {
        let mut applied = false;

        if let Some(name) = env("THEME_GRAPH_CONFIG_NAME")
            && !name.is_empty()
        {
            settings.config_name = name;
            applied = true;
        }

        if let Some(dirs) = env("THEME_GRAPH_PACKAGE_DIRS") {
            settings.package_dirs = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect();
            applied = true;
        }

        applied
    }

    /// Get the loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Consume the loader and return the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Tiers that contributed, lowest first.
    pub fn sources(&self) -> &[SettingsSource] {
        &self.sources
    }
}

fn read_settings_file(path: &Path) -> ThemeResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
    let value: Value = serde_yaml::from_str(&content)
        .map_err(|e| ThemeError::Settings(format!("{}: {}", path.display(), e)))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults_only() {
        // Create empty temp dirs so no settings files are found
        let temp = TempDir::new().unwrap();
        let paths = SettingsPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = SettingsLoader::load_with_env(paths, no_env).unwrap();
        assert_eq!(loader.settings(), &Settings::default());
        assert_eq!(loader.sources().len(), 1);
        assert_eq!(loader.sources()[0].tier, ConfigTier::Defaults);
    }

    #[test]
    fn test_user_settings_override_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join(SETTINGS_FILE),
            "config_name: theme-config\npackage_dirs: [themes]\n",
        )
        .unwrap();
        std::fs::write(user_dir.join(SETTINGS_FILE), "config_name: user-config\n").unwrap();

        let paths = SettingsPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = SettingsLoader::load_with_env(paths, no_env).unwrap();
        let settings = loader.settings();

        // config_name should be from user
        assert_eq!(settings.config_name, "user-config");
        // package_dirs should be from project, replaced not appended
        assert_eq!(settings.package_dirs, vec!["themes"]);

        let tiers: Vec<_> = loader.sources().iter().map(|s| s.tier).collect();
        assert_eq!(
            tiers,
            vec![ConfigTier::Defaults, ConfigTier::Project, ConfigTier::User]
        );
    }

    #[test]
    fn test_explicit_file_replaces_project_and_user() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join(SETTINGS_FILE), "config_name: project\n").unwrap();
        let explicit = temp.path().join("explicit.yaml");
        std::fs::write(&explicit, "default_site_plugin: my-site\n").unwrap();

        let mut paths = SettingsPaths::with_dirs(Some(project_dir), None);
        paths.explicit_file = Some(explicit);
        let loader = SettingsLoader::load_with_env(paths, no_env).unwrap();

        assert_eq!(loader.settings().config_name, "site-config");
        assert_eq!(loader.settings().default_site_plugin, "my-site");
    }

    #[test]
    fn test_environment_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join(SETTINGS_FILE), "config_name: project\n").unwrap();

        let paths = SettingsPaths::with_dirs(Some(project_dir), None);
        let loader = SettingsLoader::load_with_env(paths, |key| match key {
            "THEME_GRAPH_CONFIG_NAME" => Some("env-config".to_string()),
            "THEME_GRAPH_PACKAGE_DIRS" => Some("vendor, node_modules,".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(loader.settings().config_name, "env-config");
        assert_eq!(loader.settings().package_dirs, vec!["vendor", "node_modules"]);
        assert_eq!(
            loader.sources().last().unwrap().tier,
            ConfigTier::Environment
        );
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join(SETTINGS_FILE), "package_dirs: 12\n").unwrap();

        let paths = SettingsPaths::with_dirs(Some(project_dir), None);
        let err = SettingsLoader::load_with_env(paths, no_env).unwrap_err();
        assert!(matches!(err, ThemeError::Settings(_)));
    }
}
