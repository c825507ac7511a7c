//! Structured error types for theme resolution.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Resolution errors
    PackageNotFound,
    ThemeCycle,

    // Config errors
    ConfigParse,
    InvalidConfig,
    MissingOption,
    InvalidSettings,

    // Internal errors
    IoError,
}

/// Errors raised while resolving and merging themes.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Cannot find package '{name}' (searched: {})", display_paths(.searched))]
    PackageNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to parse {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid {context}: {message}")]
    InvalidConfig { context: String, message: String },

    #[error("Theme '{theme}' requires option '{key}' but none was given")]
    MissingOption { theme: String, key: String },

    #[error("Theme cycle detected: {}", .chain.join(" -> "))]
    ThemeCycle { chain: Vec<String> },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl ThemeError {
    pub fn invalid(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ThemeError::PackageNotFound { .. } => ErrorCode::PackageNotFound,
            ThemeError::ConfigParse { .. } => ErrorCode::ConfigParse,
            ThemeError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            ThemeError::MissingOption { .. } => ErrorCode::MissingOption,
            ThemeError::ThemeCycle { .. } => ErrorCode::ThemeCycle,
            ThemeError::Io { .. } => ErrorCode::IoError,
            ThemeError::Settings(_) => ErrorCode::InvalidSettings,
        }
    }

    /// JSON body used when reporting the error from the CLI.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for theme operations.
pub type ThemeResult<T> = std::result::Result<T, ThemeError>;
