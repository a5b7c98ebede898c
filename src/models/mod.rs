// src/models/mod.rs

//! Data structures shared across the agent.

pub mod config;
pub mod locale;
pub mod record;
pub mod state;

pub use config::{Config, DriverConfig, ExportConfig, FeedConfig, SelectorsConfig, ThresholdConfig};
pub use locale::{LocaleConfig, MessageLocale, PhraseLocale};
pub use record::Record;
pub use state::{FailureReason, ScanState};
