//! Plugin loading: turns a site's declared plugins into located packages.

use crate::config::DEFAULT_SITE_PLUGIN;
use crate::error::ThemeResult;
use crate::source::ThemeSource;
use crate::types::{Config, LoadedPlugin, Options};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves a config's declared plugins to names and directories.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load_plugins(
        &self,
        config: &Config,
        root_dir: Option<&Path>,
    ) -> ThemeResult<Vec<LoadedPlugin>>;
}

/// Loads every `plugins` entry through a [`ThemeSource`], in declaration
/// order, then appends the implicit site plugin.
pub struct SitePluginLoader {
    source: Arc<dyn ThemeSource>,
    site_plugin: String,
}

impl SitePluginLoader {
    pub fn new(source: Arc<dyn ThemeSource>) -> Self {
        Self {
            source,
            site_plugin: DEFAULT_SITE_PLUGIN.to_string(),
        }
    }

    /// Override the name of the implicit site plugin.
    pub fn with_site_plugin(mut self, name: impl Into<String>) -> Self {
        self.site_plugin = name.into();
        self
    }
}

#[async_trait]
impl PluginLoader for SitePluginLoader {
    async fn load_plugins(
        &self,
        config: &Config,
        root_dir: Option<&Path>,
    ) -> ThemeResult<Vec<LoadedPlugin>> {
        let mut loaded = Vec::new();

        for spec in config.plugins()? {
            let resolve = self.source.package_dir(spec.name(), root_dir).await?;
            debug!(plugin = %spec.name(), dir = %resolve.display(), "Loaded plugin");
            loaded.push(LoadedPlugin {
                name: spec.name().to_string(),
                resolve,
                options: spec.options_or_empty(),
            });
        }

        let site_dir = match root_dir {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        loaded.push(LoadedPlugin {
            name: self.site_plugin.clone(),
            resolve: site_dir,
            options: Options::new(),
        });

        Ok(loaded)
    }
}
