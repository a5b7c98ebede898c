// src/render.rs

//! Rendering collaborator interface.
//!
//! The core calls `render` after every state-affecting operation and never
//! consumes a return value; the panel itself lives outside this crate.

use crate::models::{LocaleConfig, Record, ScanState};

/// Receives state snapshots for display. Fire-and-forget.
pub trait Renderer {
    fn render(&self, state: &ScanState, records: &[Record], status: &str);
}

/// Logs a one-line status through the logging facade.
pub struct ConsoleRenderer {
    template: String,
}

impl ConsoleRenderer {
    pub fn new(locale: &LocaleConfig) -> Self {
        Self {
            template: locale.messages.status_line.clone(),
        }
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, state: &ScanState, records: &[Record], status: &str) {
        let line = self
            .template
            .replace("{collected}", &records.len().to_string())
            .replace("{seen}", &state.seen_ids.len().to_string())
            .replace("{scrolls}", &state.scroll_count.to_string())
            .replace("{threshold}", &state.threshold.to_string());
        log::info!("{line} | {status}");
    }
}

/// Discards everything. Used in tests and headless runs.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _state: &ScanState, _records: &[Record], _status: &str) {}
}
