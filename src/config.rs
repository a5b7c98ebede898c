// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::locale::load_locale_or_default;
use crate::models::{Config, LocaleConfig};

/// Load and validate config and locale from their conventional locations.
pub fn load_all(base_path: &Path) -> Result<(Config, LocaleConfig)> {
    let config = Config::load_or_default(base_path.join("data/config.toml"));
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    let locale = load_locale_or_default(base_path.join("data/locale.toml"));
    Ok((config, locale))
}
