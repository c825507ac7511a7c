//! Theme Graph CLI
//!
//! Resolves the themes a site declares and prints the merged config, the
//! flattened theme list, or the effective tool settings.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use theme_graph::cli::{Cli, Command};
use theme_graph::config::SettingsLoader;
use theme_graph::error::ThemeError;
use theme_graph::format::{SettingsReport, format_config, format_settings, format_themes};
use theme_graph::logging::{self, LogTarget};
use theme_graph::themes::ThemeGraph;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        // Structured body for theme errors, plain text for everything else
        match err.downcast_ref::<ThemeError>() {
            Some(theme_err) => eprintln!("{}", theme_err.to_json()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let root = absolute(root)?;
    debug!(root = %root.display(), "Using site root");

    let loader = SettingsLoader::load(&root)?;

    let output = match cli.command() {
        Command::Settings => {
            let report = SettingsReport {
                settings: loader.settings(),
                sources: loader.sources(),
            };
            format_settings(&report, cli.format)?
        }
        Command::Resolve => {
            let graph = ThemeGraph::from_settings(loader.into_settings());
            let result = graph.load_site(&root).await?;
            format_config(&result.config, cli.format)?
        }
        Command::Themes => {
            let graph = ThemeGraph::from_settings(loader.into_settings());
            let result = graph.load_site(&root).await?;
            format_themes(&result.themes, cli.format)?
        }
    };

    println!("{}", output);
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(cwd.join(path))
}
