//! TOML-based configuration for Trellis.
//!
//! Supports a config file (trellis.toml) with sensible defaults for every
//! section.
//!
//! Example configuration:
//! ```toml
//! [locales]
//! available = ["en", "vi"]
//! default = "en"
//!
//! [duplication]
//! slug_fields = ["slug"]
//! title_fields = ["title", "name"]
//! slug_suffix = "-copy"
//!
//! [duplication.copy_text]
//! en = "Copy"
//! vi = "Bản sao"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub locales: LocaleSettings,

    #[serde(default)]
    pub duplication: DuplicationSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Locales the application serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleSettings {
    #[serde(default = "default_locales")]
    pub available: Vec<String>,

    #[serde(default = "default_locale", rename = "default")]
    pub default_locale: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            available: default_locales(),
            default_locale: default_locale(),
        }
    }
}

/// Knobs for the duplication engine's identifying-field renaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicationSettings {
    /// Fields renamed with the fixed literal suffix (URL-slug-like).
    #[serde(default = "default_slug_fields")]
    pub slug_fields: Vec<String>,

    /// Fields renamed with the parenthesized counted marker (title-like).
    #[serde(default = "default_title_fields")]
    pub title_fields: Vec<String>,

    /// The fixed literal suffix.
    #[serde(default = "default_slug_suffix")]
    pub slug_suffix: String,

    /// Copy marker text per locale. Missing locales fall back to
    /// [`DuplicationSettings::DEFAULT_COPY_TEXT`].
    #[serde(default)]
    pub copy_text: HashMap<String, String>,
}

impl DuplicationSettings {
    pub const DEFAULT_COPY_TEXT: &'static str = "Copy";

    /// Copy marker text for a locale.
    pub fn copy_text(&self, locale: Option<&str>) -> &str {
        locale
            .and_then(|l| self.copy_text.get(l))
            .map_or(Self::DEFAULT_COPY_TEXT, String::as_str)
    }
}

impl Default for DuplicationSettings {
    fn default() -> Self {
        Self {
            slug_fields: default_slug_fields(),
            title_fields: default_title_fields(),
            slug_suffix: default_slug_suffix(),
            copy_text: HashMap::new(),
        }
    }
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "vi".to_string()]
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_slug_fields() -> Vec<String> {
    vec!["slug".to_string()]
}

fn default_title_fields() -> Vec<String> {
    vec!["title".to_string(), "name".to_string()]
}

fn default_slug_suffix() -> String {
    "-copy".to_string()
}
