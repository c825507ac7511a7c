//! Output formatting for configs, theme lists and settings.

use crate::config::{Settings, SettingsSource};
use crate::types::{Config, Options, ResolvedTheme};
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[value(alias = "md")]
    Markdown,
}

/// One row of the `themes` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSummary {
    pub name: String,
    pub dir: PathBuf,
    pub options: Options,
    pub has_config: bool,
}

impl From<&ResolvedTheme> for ThemeSummary {
    fn from(theme: &ResolvedTheme) -> Self {
        Self {
            name: theme.name.clone(),
            dir: theme.dir.clone(),
            options: theme.spec.options_or_empty(),
            has_config: theme.config.is_some(),
        }
    }
}

/// Effective settings plus the tiers that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsReport<'a> {
    pub settings: &'a Settings,
    pub sources: &'a [SettingsSource],
}

fn render_data<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Markdown => {
            format!("```json\n{}\n```", serde_json::to_string_pretty(value)?)
        }
    })
}

/// Render a merged config.
pub fn format_config(config: &Config, format: OutputFormat) -> Result<String> {
    render_data(config, format)
}

/// Render the flattened theme list.
pub fn format_themes(themes: &[ResolvedTheme], format: OutputFormat) -> Result<String> {
    let summaries: Vec<ThemeSummary> = themes.iter().map(ThemeSummary::from).collect();
    match format {
        OutputFormat::Markdown => Ok(format_themes_markdown(&summaries)),
        _ => render_data(&summaries, format),
    }
}

/// Render the settings report.
pub fn format_settings(report: &SettingsReport<'_>, format: OutputFormat) -> Result<String> {
    render_data(report, format)
}

/// Format the theme list as markdown, one numbered entry per theme.
pub fn format_themes_markdown(themes: &[ThemeSummary]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Themes ({})\n\n", themes.len()));
    if themes.is_empty() {
        md.push_str("No themes.\n");
        return md;
    }

    for (i, theme) in themes.iter().enumerate() {
        md.push_str(&format!("{}. **{}**\n", i + 1, theme.name));
        md.push_str(&format!("   - **dir**: `{}`\n", theme.dir.display()));
        if !theme.has_config {
            md.push_str("   - **config**: none\n");
        }
        if !theme.options.is_empty() {
            md.push_str(&format!(
                "   - **options**: `{}`\n",
                serde_json::Value::Object(theme.options.clone())
            ));
        }
    }

    md
}
