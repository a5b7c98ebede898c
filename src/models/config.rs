// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Feed context and identifier rules
    #[serde(default)]
    pub feed: FeedConfig,

    /// CSS selectors for item scanning
    #[serde(default)]
    pub selectors: SelectorsConfig,

    /// Scroll driver timing and retry settings
    #[serde(default)]
    pub driver: DriverConfig,

    /// Allowed threshold values
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Export output settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.expected_host.trim().is_empty() {
            return Err(AppError::validation("feed.expected_host is empty"));
        }
        if self.feed.post_url_prefix.trim().is_empty() {
            return Err(AppError::validation("feed.post_url_prefix is empty"));
        }
        if self.feed.id_attr.trim().is_empty() {
            return Err(AppError::validation("feed.id_attr is empty"));
        }
        Regex::new(&self.feed.id_pattern)
            .map_err(|e| AppError::validation(format!("feed.id_pattern invalid: {e}")))?;
        if self.selectors.item_selector.trim().is_empty() {
            return Err(AppError::validation("selectors.item_selector is empty"));
        }
        if self.driver.max_retries == 0 {
            return Err(AppError::validation("driver.max_retries must be > 0"));
        }
        if self.driver.max_scrolls == 0 {
            return Err(AppError::validation("driver.max_scrolls must be > 0"));
        }
        if self.thresholds.allowed.is_empty() {
            return Err(AppError::validation("thresholds.allowed is empty"));
        }
        if !self.thresholds.allowed.is_sorted() {
            return Err(AppError::validation("thresholds.allowed must be ascending"));
        }
        if !self.thresholds.allowed.contains(&self.thresholds.initial) {
            return Err(AppError::validation(
                "thresholds.initial is not in thresholds.allowed",
            ));
        }
        Ok(())
    }
}

/// Feed context and identifier rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Host the activation check expects the document to live on
    #[serde(default = "defaults::expected_host")]
    pub expected_host: String,

    /// Path prefix of the feed page
    #[serde(default = "defaults::feed_path_prefix")]
    pub feed_path_prefix: String,

    /// Prefix concatenated with the raw identifier to synthesize a post URL
    #[serde(default = "defaults::post_url_prefix")]
    pub post_url_prefix: String,

    /// Attribute carrying the per-item identifier
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,

    /// Pattern a valid namespaced activity identifier must match
    #[serde(default = "defaults::id_pattern")]
    pub id_pattern: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            expected_host: defaults::expected_host(),
            feed_path_prefix: defaults::feed_path_prefix(),
            post_url_prefix: defaults::post_url_prefix(),
            id_attr: defaults::id_attr(),
            id_pattern: defaults::id_pattern(),
        }
    }
}

/// CSS selectors for item scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorsConfig {
    /// Selector matching one feed item's root element
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// Selector for metric-bearing controls inside an item
    #[serde(default = "defaults::metric_control_selector")]
    pub metric_control_selector: String,

    /// Selector for load-more candidate controls (class/role scan)
    #[serde(default = "defaults::load_more_selector")]
    pub load_more_selector: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            item_selector: defaults::item_selector(),
            metric_control_selector: defaults::metric_control_selector(),
            load_more_selector: defaults::load_more_selector(),
        }
    }
}

/// Scroll driver timing and retry settings.
///
/// All waits are fixed, non-adaptive timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Periodic tick interval in milliseconds
    #[serde(default = "defaults::tick_interval")]
    pub tick_interval_ms: u64,

    /// Wait after a scroll command before validating, in milliseconds
    #[serde(default = "defaults::detect_delay")]
    pub detect_delay_ms: u64,

    /// Wait after activating a load-more control, in milliseconds
    #[serde(default = "defaults::post_load_delay")]
    pub post_load_delay_ms: u64,

    /// Backoff before retrying after a stall, in milliseconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Consecutive no-progress validations before the terminal failure
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Global scroll-attempt ceiling; forces an unconditional pause
    #[serde(default = "defaults::max_scrolls")]
    pub max_scrolls: u32,

    /// Extent growth below this margin does not count as progress
    #[serde(default = "defaults::extent_tolerance")]
    pub extent_tolerance_px: f64,

    /// Position movement below this margin does not count as progress
    #[serde(default = "defaults::position_tolerance")]
    pub position_tolerance_px: f64,

    /// Distance from the bottom within which the feed counts as "near bottom"
    #[serde(default = "defaults::bottom_margin")]
    pub bottom_margin_px: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: defaults::tick_interval(),
            detect_delay_ms: defaults::detect_delay(),
            post_load_delay_ms: defaults::post_load_delay(),
            retry_backoff_ms: defaults::retry_backoff(),
            max_retries: defaults::max_retries(),
            max_scrolls: defaults::max_scrolls(),
            extent_tolerance_px: defaults::extent_tolerance(),
            position_tolerance_px: defaults::position_tolerance(),
            bottom_margin_px: defaults::bottom_margin(),
        }
    }
}

/// Allowed threshold values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Fixed ordered set of accepted threshold values
    #[serde(default = "defaults::allowed_thresholds")]
    pub allowed: Vec<u64>,

    /// Threshold used when no preference is stored
    #[serde(default = "defaults::initial_threshold")]
    pub initial: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            allowed: defaults::allowed_thresholds(),
            initial: defaults::initial_threshold(),
        }
    }
}

/// Export output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported files
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn expected_host() -> String {
        "www.linkedin.com".into()
    }
    pub fn feed_path_prefix() -> String {
        "/feed".into()
    }
    pub fn post_url_prefix() -> String {
        "https://www.linkedin.com/feed/update/".into()
    }
    pub fn id_attr() -> String {
        "data-id".into()
    }
    pub fn id_pattern() -> String {
        r"^urn:[a-z]+:activity:\d+$".into()
    }

    // Selector defaults
    pub fn item_selector() -> String {
        "div[data-id]".into()
    }
    pub fn metric_control_selector() -> String {
        "button, a, span".into()
    }
    pub fn load_more_selector() -> String {
        "button, a[role='button']".into()
    }

    // Driver defaults
    pub fn tick_interval() -> u64 {
        2500
    }
    pub fn detect_delay() -> u64 {
        1200
    }
    pub fn post_load_delay() -> u64 {
        1500
    }
    pub fn retry_backoff() -> u64 {
        4000
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn max_scrolls() -> u32 {
        200
    }
    pub fn extent_tolerance() -> f64 {
        16.0
    }
    pub fn position_tolerance() -> f64 {
        16.0
    }
    pub fn bottom_margin() -> f64 {
        120.0
    }

    // Threshold defaults
    pub fn allowed_thresholds() -> Vec<u64> {
        vec![0, 10, 25, 50, 100, 250, 500, 1000]
    }
    pub fn initial_threshold() -> u64 {
        100
    }

    // Export defaults
    pub fn output_dir() -> String {
        "out".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_id_pattern_rejected() {
        let mut config = Config::default();
        config.feed.id_pattern = "[[".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_threshold_must_be_allowed() {
        let mut config = Config::default();
        config.thresholds.initial = 123;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = Config::default();
        config.driver.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [driver]
            max_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.driver.max_retries, 5);
        assert_eq!(config.driver.max_scrolls, 200);
        assert_eq!(config.thresholds.initial, 100);
    }
}
