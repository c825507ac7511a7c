//! Resolving a single theme reference to its package and config.

use crate::error::ThemeResult;
use crate::source::ThemeSource;
use crate::types::{ResolvedTheme, ThemeSpec};
use std::path::Path;
use tracing::debug;

/// Locate a theme's package and compute its config.
///
/// A factory config is called with the spec's options (or an empty mapping).
/// A theme with no config file resolves with `config: None`.
pub async fn resolve_theme(
    source: &dyn ThemeSource,
    spec: &ThemeSpec,
    root_dir: Option<&Path>,
) -> ThemeResult<ResolvedTheme> {
    let name = spec.name().to_string();
    let dir = source.package_dir(&name, root_dir).await?;

    let config = match source.load_config(&dir, &name).await? {
        Some(exported) => Some(exported.resolve(&spec.options_or_empty())?),
        None => None,
    };
    debug!(theme = %name, dir = %dir.display(), has_config = config.is_some(), "Resolved theme");

    Ok(ResolvedTheme {
        name,
        config,
        spec: spec.clone(),
        dir,
    })
}
