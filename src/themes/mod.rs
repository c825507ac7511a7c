//! Theme resolution.
//!
//! A theme is a package that exports a site config. That config may name
//! parent themes under `__experimentalThemes`. The theme pass:
//!
//! 1. picks the site's plugins that ship a config file, plus any themes the
//!    site lists under `__experimentalThemes`
//! 2. resolves each one and flattens its parents, ancestors first
//! 3. appends every theme to its own `plugins`, folds all theme configs in
//!    order, and merges the site config over the result
//!
//! Everything runs strictly in sequence so the order of package lookups,
//! and of anything cached along the way, is deterministic.

mod flatten;
mod load;
mod resolve;

pub use flatten::process_theme;
pub use load::{ThemeGraph, load_site_config, load_themes};
pub use resolve::resolve_theme;
