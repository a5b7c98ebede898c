// src/locale.rs

//! Locale file loading.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::LocaleConfig;

/// Load locale configuration from a TOML file.
pub fn load_locale<P: AsRef<Path>>(path: P) -> Result<LocaleConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load locale configuration with fallback to defaults.
pub fn load_locale_or_default<P: AsRef<Path>>(path: P) -> LocaleConfig {
    match load_locale(&path) {
        Ok(locale) => locale,
        Err(e) => {
            log::warn!(
                "Failed to load locale from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            LocaleConfig::default()
        }
    }
}
