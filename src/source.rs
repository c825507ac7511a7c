//! Package and config-file lookup behind the [`ThemeSource`] trait.
//!
//! [`FsThemeSource`] searches package directories on disk.
//! [`MemorySource`] holds packages in memory for tests and embedders.

use crate::config::{Settings, find_config_file, read_config_file, theme_config_from_value};
use crate::error::{ThemeError, ThemeResult};
use crate::types::{Config, ThemeConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Locates theme packages and loads their exported configuration.
#[async_trait]
pub trait ThemeSource: Send + Sync {
    /// Map a package name to its installed directory.
    async fn package_dir(&self, name: &str, root_dir: Option<&Path>) -> ThemeResult<PathBuf>;

    /// Load the config exported from `dir`. `Ok(None)` when there is none.
    async fn load_config(&self, dir: &Path, theme: &str) -> ThemeResult<Option<ThemeConfig>>;

    /// Whether `dir` contains a config file.
    async fn has_config(&self, dir: &Path) -> ThemeResult<bool>;
}

/// Filesystem-backed source driven by [`Settings`].
///
/// Loaded configs are cached by directory for the lifetime of the source.
#[derive(Debug)]
pub struct FsThemeSource {
    settings: Settings,
    cache: Mutex<HashMap<PathBuf, Option<ThemeConfig>>>,
}

impl FsThemeSource {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn cached(&self, dir: &Path) -> Option<Option<ThemeConfig>> {
        self.cache.lock().ok()?.get(dir).cloned()
    }

    fn remember(&self, dir: &Path, config: &Option<ThemeConfig>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(dir.to_path_buf(), config.clone());
        }
    }
}

/// Names written as paths (`./x`, `../x`, `/x`) are not searched for.
fn is_path_like(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../") || Path::new(name).is_absolute()
}

/// Names with a separator may be a directory under the root (`themes/local`)
/// or a scoped package (`@scope/pkg`). The directory is tried first.
fn has_separator(name: &str) -> bool {
    name.contains('/') || name.contains(std::path::MAIN_SEPARATOR)
}

/// A missing path is not a directory. Other metadata failures are errors.
async fn is_dir(path: &Path) -> ThemeResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ThemeError::io(path, e)),
    }
}

#[async_trait]
impl ThemeSource for FsThemeSource {
    async fn package_dir(&self, name: &str, root_dir: Option<&Path>) -> ThemeResult<PathBuf> {
        let mut searched = Vec::new();

        if is_path_like(name) || has_separator(name) {
            let candidate = match root_dir {
                Some(root) => root.join(name),
                None => PathBuf::from(name),
            };
            if is_dir(&candidate).await? {
                debug!(package = %name, dir = %candidate.display(), "Resolved package path");
                return Ok(candidate);
            }
            searched.push(candidate);
            if is_path_like(name) {
                return Err(ThemeError::PackageNotFound {
                    name: name.to_string(),
                    searched,
                });
            }
        }

        let cwd = std::env::current_dir().ok();
        let mut bases: Vec<&Path> = Vec::new();
        if let Some(root) = root_dir {
            bases.push(root);
        }
        if let Some(ref cwd) = cwd
            && root_dir != Some(cwd.as_path())
        {
            bases.push(cwd);
        }

        for base in bases {
            for package_dir in &self.settings.package_dirs {
                let candidate = base.join(package_dir).join(name);
                if is_dir(&candidate).await? {
                    debug!(package = %name, dir = %candidate.display(), "Resolved package");
                    return Ok(candidate);
                }
                searched.push(candidate);
            }
        }

        Err(ThemeError::PackageNotFound {
            name: name.to_string(),
            searched,
        })
    }

    async fn load_config(&self, dir: &Path, theme: &str) -> ThemeResult<Option<ThemeConfig>> {
        if let Some(config) = self.cached(dir) {
            return Ok(config);
        }

        let config = match find_config_file(dir, &self.settings.config_name).await? {
            Some(path) => {
                debug!(theme = %theme, path = %path.display(), "Loading theme config");
                Some(read_config_file(&path, theme).await?)
            }
            None => None,
        };
        self.remember(dir, &config);
        Ok(config)
    }

    async fn has_config(&self, dir: &Path) -> ThemeResult<bool> {
        Ok(find_config_file(dir, &self.settings.config_name)
            .await?
            .is_some())
    }
}

/// In-memory source. Each package lives at `/packages/<name>`.
///
/// Records every `package_dir` lookup so callers can check resolution order.
#[derive(Debug, Default)]
pub struct MemorySource {
    packages: HashMap<String, (PathBuf, Option<ThemeConfig>)>,
    lookups: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory a package named `name` is reported at.
    pub fn dir_for(name: &str) -> PathBuf {
        Path::new("/packages").join(name)
    }

    /// Add a package with no config file.
    pub fn with_package(mut self, name: &str) -> Self {
        self.packages
            .insert(name.to_string(), (Self::dir_for(name), None));
        self
    }

    /// Add a package exporting the given config.
    pub fn with_theme(mut self, name: &str, config: ThemeConfig) -> Self {
        self.packages
            .insert(name.to_string(), (Self::dir_for(name), Some(config)));
        self
    }

    /// Add a package whose config document is given as JSON. Placeholders
    /// make it a factory, exactly like a file on disk.
    pub fn with_document(self, name: &str, document: Value) -> ThemeResult<Self> {
        let config = theme_config_from_value(document, name)?;
        Ok(self.with_theme(name, config))
    }

    /// Add a package exporting a static config.
    pub fn with_config(self, name: &str, config: Config) -> Self {
        self.with_theme(name, ThemeConfig::Static(config))
    }

    /// Package names in the order they were looked up.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    fn by_dir(&self, dir: &Path) -> Option<&(PathBuf, Option<ThemeConfig>)> {
        self.packages.values().find(|(d, _)| d == dir)
    }
}

#[async_trait]
impl ThemeSource for MemorySource {
    async fn package_dir(&self, name: &str, _root_dir: Option<&Path>) -> ThemeResult<PathBuf> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(name.to_string());
        }
        self.packages
            .get(name)
            .map(|(dir, _)| dir.clone())
            .ok_or_else(|| ThemeError::PackageNotFound {
                name: name.to_string(),
                searched: vec![Self::dir_for(name)],
            })
    }

    async fn load_config(&self, dir: &Path, _theme: &str) -> ThemeResult<Option<ThemeConfig>> {
        Ok(self.by_dir(dir).and_then(|(_, config)| config.clone()))
    }

    async fn has_config(&self, dir: &Path) -> ThemeResult<bool> {
        Ok(self.by_dir(dir).is_some_and(|(_, config)| config.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn settings() -> Settings {
        Settings::default()
    }

    #[tokio::test]
    async fn test_package_dir_searches_in_order() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("plugins").join("theme-a");
        let installed = temp.path().join("node_modules").join("theme-a");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::create_dir_all(&installed).unwrap();

        let source = FsThemeSource::new(settings());
        let dir = source
            .package_dir("theme-a", Some(temp.path()))
            .await
            .unwrap();
        assert_eq!(dir, local);
    }

    #[tokio::test]
    async fn test_package_dir_resolves_relative_paths_from_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("local-theme")).unwrap();

        let source = FsThemeSource::new(settings());
        let dir = source
            .package_dir("./local-theme", Some(temp.path()))
            .await
            .unwrap();
        assert_eq!(dir, temp.path().join("./local-theme"));
    }

    #[tokio::test]
    async fn test_package_dir_uses_existing_path_under_root() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("themes").join("local");
        std::fs::create_dir_all(&local).unwrap();

        let source = FsThemeSource::new(settings());
        let dir = source
            .package_dir("themes/local", Some(temp.path()))
            .await
            .unwrap();
        assert_eq!(dir, temp.path().join("themes/local"));
    }

    #[tokio::test]
    async fn test_package_dir_scoped_name_falls_back_to_search() {
        let temp = TempDir::new().unwrap();
        let installed = temp.path().join("node_modules").join("@acme").join("theme");
        std::fs::create_dir_all(&installed).unwrap();

        let source = FsThemeSource::new(settings());
        let dir = source
            .package_dir("@acme/theme", Some(temp.path()))
            .await
            .unwrap();
        assert_eq!(dir, temp.path().join("node_modules").join("@acme/theme"));
    }

    #[tokio::test]
    async fn test_relative_path_is_not_searched_in_package_dirs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("node_modules").join("local-theme")).unwrap();

        let source = FsThemeSource::new(settings());
        let err = source
            .package_dir("./local-theme", Some(temp.path()))
            .await
            .unwrap_err();
        match err {
            ThemeError::PackageNotFound { searched, .. } => {
                assert_eq!(searched, vec![temp.path().join("./local-theme")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_package_dir_under_a_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        // `plugins` is a file, so looking inside it fails with "not a directory"
        std::fs::write(temp.path().join("plugins"), "").unwrap();

        let source = FsThemeSource::new(settings());
        let err = source
            .package_dir("theme-a", Some(temp.path()))
            .await
            .unwrap_err();
        match err {
            ThemeError::Io { path, .. } => {
                assert_eq!(path, temp.path().join("plugins").join("theme-a"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_package_dir_not_found_lists_searched() {
        let temp = TempDir::new().unwrap();
        let source = FsThemeSource::new(settings());
        let err = source
            .package_dir("theme-missing", Some(temp.path()))
            .await
            .unwrap_err();
        match err {
            ThemeError::PackageNotFound { name, searched } => {
                assert_eq!(name, "theme-missing");
                assert!(searched.contains(&temp.path().join("plugins").join("theme-missing")));
                assert!(
                    searched.contains(&temp.path().join("node_modules").join("theme-missing"))
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let source = FsThemeSource::new(settings());
        assert!(
            source
                .load_config(temp.path(), "theme")
                .await
                .unwrap()
                .is_none()
        );
        assert!(!source.has_config(temp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_config_is_cached_per_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site-config.yaml");
        std::fs::write(&path, "title: first\n").unwrap();

        let source = FsThemeSource::new(settings());
        let first = source.load_config(temp.path(), "theme").await.unwrap();

        std::fs::write(&path, "title: second\n").unwrap();
        let second = source.load_config(temp.path(), "theme").await.unwrap();

        let title = |c: Option<ThemeConfig>| {
            c.unwrap()
                .resolve(&Default::default())
                .unwrap()
                .get("title")
                .cloned()
        };
        assert_eq!(title(first), Some(json!("first")));
        assert_eq!(title(second), Some(json!("first")));
    }

    #[tokio::test]
    async fn test_custom_config_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("theme.json"), r#"{"a": 1}"#).unwrap();

        let source = FsThemeSource::new(Settings {
            config_name: "theme".into(),
            ..Settings::default()
        });
        assert!(source.has_config(temp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_source_records_lookups() {
        let source = MemorySource::new().with_package("a").with_package("b");
        source.package_dir("b", None).await.unwrap();
        source.package_dir("a", None).await.unwrap();
        assert!(source.package_dir("c", None).await.is_err());
        assert_eq!(source.lookups(), vec!["b", "a", "c"]);
    }
}
