//! Configuration module for Trellis.
//!
//! Handles locale settings and duplication knobs, loaded from TOML.

mod settings;

pub use settings::{DuplicationSettings, LocaleSettings, Settings, SettingsError};
