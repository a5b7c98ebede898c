// src/models/locale.rs

//! Localized text tables: metric labels, load-more phrases, operator messages.

use serde::{Deserialize, Serialize};

/// Root locale configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Label and phrase tables used for matching page text
    #[serde(default)]
    pub phrases: PhraseLocale,

    /// Operator-facing message templates
    #[serde(default)]
    pub messages: MessageLocale,
}

/// Ordered language-variant tables matched against page text.
///
/// Matching is substring-based and checked in table order, so put the
/// most common variants first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseLocale {
    /// Substrings identifying the metric-bearing control inside an item
    pub metric_labels: Vec<String>,

    /// Substrings identifying a load-more control
    pub load_more: Vec<String>,

    /// Unit word appended after the metric in text export
    pub metric_unit: String,
}

/// Operator-facing message templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLocale {
    pub scanning: String,
    pub paused: String,
    pub resumed: String,
    pub failed_stall: String,
    pub failed_end_of_feed: String,
    pub wrong_page: String,
    pub status_line: String,
    pub export_fallback: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            phrases: PhraseLocale::default(),
            messages: MessageLocale::default(),
        }
    }
}

impl Default for PhraseLocale {
    fn default() -> Self {
        Self {
            metric_labels: vec![
                "comments".into(),
                "comment".into(),
                "commentaires".into(),
                "Kommentare".into(),
                "comentarios".into(),
                "댓글".into(),
            ],
            load_more: vec![
                "Show new posts".into(),
                "Load more".into(),
                "Show more results".into(),
                "Plus de résultats".into(),
                "Mehr anzeigen".into(),
                "더 보기".into(),
            ],
            metric_unit: "comments".into(),
        }
    }
}

impl Default for MessageLocale {
    fn default() -> Self {
        Self {
            scanning: "Scanning feed...".into(),
            paused: "Scan paused.".into(),
            resumed: "Scan resumed.".into(),
            failed_stall: "Scroll stalled after {retries} retries; scan stopped.".into(),
            failed_end_of_feed: "Reached the end of the feed; scan stopped.".into(),
            wrong_page: "This is not the expected feed page: {url}".into(),
            status_line: "{collected} collected | {seen} seen | {scrolls} scrolls | threshold {threshold}".into(),
            export_fallback: "Export failed; raw records follow so nothing is lost.".into(),
        }
    }
}
