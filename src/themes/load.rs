//! The theme pass: pick themes from a site's plugins, flatten them, and fold
//! their configs into the site config.

use super::flatten::process_theme;
use super::resolve::resolve_theme;
use crate::config::{Settings, merge, merge_all};
use crate::error::ThemeResult;
use crate::plugins::{PluginLoader, SitePluginLoader};
use crate::source::{FsThemeSource, ThemeSource};
use crate::types::{Config, LoadedPlugin, Options, PluginSpec, ThemeLoadResult, ThemeSpec};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the theme pass over a site config.
///
/// Returns `Ok(None)` when the site uses no themes; the caller keeps its
/// config as is. Otherwise the result holds the merged config, where the
/// site config wins over every theme and later themes win over earlier
/// ones, plus the flattened theme list in load order.
///
/// The plugin named `settings.default_site_plugin` is never a theme.
pub async fn load_themes(
    plugin_loader: &dyn PluginLoader,
    source: &dyn ThemeSource,
    config: &Config,
    root_dir: Option<&Path>,
    settings: &Settings,
) -> ThemeResult<Option<ThemeLoadResult>> {
    let site_plugin = settings.default_site_plugin.as_str();
    let candidates = theme_candidates(plugin_loader, source, config, root_dir, site_plugin).await?;

    if candidates.is_empty() {
        debug!("No themes declared");
        return Ok(None);
    }

    let mut themes = Vec::new();
    for spec in &candidates {
        let resolved = resolve_theme(source, spec, root_dir).await?;
        themes.extend(process_theme(source, resolved, root_dir).await?);
    }

    let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
    debug!(themes = ?names, "Flattened themes");

    let theme_configs = themes
        .iter()
        .map(|theme| theme.as_plugin_config())
        .collect::<ThemeResult<Vec<_>>>()?;
    let folded = merge_all(&theme_configs);

    Ok(Some(ThemeLoadResult {
        config: merge(&folded, config),
        themes,
    }))
}

/// Declared plugins that are themes, followed by `__experimentalThemes`.
async fn theme_candidates(
    plugin_loader: &dyn PluginLoader,
    source: &dyn ThemeSource,
    config: &Config,
    root_dir: Option<&Path>,
    site_plugin: &str,
) -> ThemeResult<Vec<ThemeSpec>> {
    let declared = config.plugins()?;
    let mut candidates = Vec::new();

    for plugin in plugin_loader.load_plugins(config, root_dir).await? {
        if plugin.name == site_plugin || !source.has_config(&plugin.resolve).await? {
            continue;
        }
        let spec = match declared_spec(&declared, &plugin) {
            Some(spec) => spec.clone(),
            None => {
                warn!(plugin = %plugin.name, "Theme plugin has no matching declaration, using its name");
                PluginSpec::Name(plugin.name.clone())
            }
        };
        candidates.push(spec);
    }

    candidates.extend(config.parent_themes()?);
    Ok(candidates)
}

/// The first declaration naming `plugin`, by name or by resolved path.
fn declared_spec<'a>(declared: &'a [PluginSpec], plugin: &LoadedPlugin) -> Option<&'a PluginSpec> {
    declared.iter().find(|spec| match spec {
        PluginSpec::Name(name) => *name == plugin.name,
        PluginSpec::Resolve { resolve, .. } => {
            *resolve == plugin.name || Path::new(resolve) == plugin.resolve
        }
    })
}

/// Load a site's own config from its root directory.
///
/// A missing file is an empty config. A factory-form site config is called
/// with no options.
pub async fn load_site_config(source: &dyn ThemeSource, root_dir: &Path) -> ThemeResult<Config> {
    match source.load_config(root_dir, "site").await? {
        Some(exported) => exported.resolve(&Options::new()),
        None => Ok(Config::new()),
    }
}

/// A ready-to-use theme pass over the filesystem.
pub struct ThemeGraph {
    source: Arc<dyn ThemeSource>,
    plugin_loader: Box<dyn PluginLoader>,
    settings: Settings,
}

impl ThemeGraph {
    /// Build the filesystem source and plugin loader from settings.
    pub fn from_settings(settings: Settings) -> Self {
        let source: Arc<dyn ThemeSource> = Arc::new(FsThemeSource::new(settings.clone()));
        let plugin_loader = SitePluginLoader::new(Arc::clone(&source))
            .with_site_plugin(settings.default_site_plugin.clone());
        Self {
            source,
            plugin_loader: Box::new(plugin_loader),
            settings,
        }
    }

    /// Use custom collaborators.
    pub fn with_parts(
        source: Arc<dyn ThemeSource>,
        plugin_loader: Box<dyn PluginLoader>,
        settings: Settings,
    ) -> Self {
        Self {
            source,
            plugin_loader,
            settings,
        }
    }

    /// Run the theme pass over an already loaded site config.
    pub async fn load(
        &self,
        config: &Config,
        root_dir: Option<&Path>,
    ) -> ThemeResult<Option<ThemeLoadResult>> {
        load_themes(
            self.plugin_loader.as_ref(),
            self.source.as_ref(),
            config,
            root_dir,
            &self.settings,
        )
        .await
    }

    /// Load the site config under `root_dir` and run the theme pass.
    ///
    /// With no themes the result holds the site config unchanged and an
    /// empty theme list.
    pub async fn load_site(&self, root_dir: &Path) -> ThemeResult<ThemeLoadResult> {
        let site = load_site_config(self.source.as_ref(), root_dir).await?;
        match self.load(&site, Some(root_dir)).await? {
            Some(result) => {
                info!(count = result.themes.len(), "Applied themes");
                Ok(result)
            }
            None => Ok(ThemeLoadResult {
                config: site,
                themes: Vec::new(),
            }),
        }
    }
}
