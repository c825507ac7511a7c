//! Configuration: merging site and theme configs, locating config files,
//! and the tool's own tiered settings.
//!
//! ## Merge Strategy
//! - Mappings: deep merge field-by-field, later configs win
//! - `plugins`: concatenated, earlier configs' plugins first
//! - Other arrays and scalars: replaced by the later config
//!
//! ## Settings Tiers
//! 1. **Defaults** - built in
//! 2. **Project** - `<root>/.theme-graph/settings.yaml`
//! 3. **User** - `~/.theme-graph/settings.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `THEME_GRAPH_SETTINGS_PATH` - Explicit settings file (replaces project and user)
//! - `THEME_GRAPH_USER_DIR` - User settings dir (default: `~/.theme-graph`)
//! - `THEME_GRAPH_CONFIG_NAME` - Config file base name
//! - `THEME_GRAPH_PACKAGE_DIRS` - Comma-separated package search dirs

mod files;
mod interpolate;
mod loader;
mod merge;
mod types;

pub use files::{
    CONFIG_EXTENSIONS, find_config_file, parse_document, prefer_default, read_config_file,
};
pub use interpolate::{has_placeholders, interpolate, theme_config_from_value};
pub use loader::{
    ConfigTier, SETTINGS_DIR, SETTINGS_FILE, SettingsLoader, SettingsPaths, SettingsSource,
};
pub use merge::{deep_merge, deep_merge_all, merge, merge_all};
pub use types::*;
