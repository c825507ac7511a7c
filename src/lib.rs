//! Theme Graph Library
//!
//! Resolves site-generator theme graphs: locates theme packages, flattens
//! their parent themes, and merges every theme config into the site config.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod plugins;
pub mod source;
pub mod themes;
pub mod types;
