// src/probe.rs

//! Feed item extraction.
//!
//! Scans the rendered document for item elements, resolves their stable
//! identifiers, reads the popularity metric from a localized labeled control,
//! and returns records at or above the session threshold. Extraction is
//! idempotent: already-seen identifiers produce no new records.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, LocaleConfig, Record, ScanState};

/// Extracts records from the currently rendered feed items.
pub struct FeedProbe {
    item_selector: Selector,
    control_selector: Selector,
    id_attr: String,
    id_pattern: Regex,
    metric_labels: Vec<String>,
    digits: Regex,
}

impl FeedProbe {
    /// Build a probe from the configured selectors and locale label table.
    pub fn new(config: &Config, locale: &LocaleConfig) -> Result<Self> {
        Ok(Self {
            item_selector: parse_selector(&config.selectors.item_selector)?,
            control_selector: parse_selector(&config.selectors.metric_control_selector)?,
            id_attr: config.feed.id_attr.clone(),
            id_pattern: Regex::new(&config.feed.id_pattern)
                .map_err(|e| AppError::validation(format!("id pattern: {e}")))?,
            metric_labels: locale.phrases.metric_labels.clone(),
            digits: Regex::new(r"\d+").expect("static digit pattern"),
        })
    }

    /// Extract new records from a document snapshot.
    ///
    /// Marks every resolvable identifier as seen, including repeats and
    /// below-threshold items. Returns only records whose metric is at or
    /// above `state.threshold`. Never errors; unparseable metrics default
    /// to zero.
    pub fn extract(&self, html: &str, state: &mut ScanState) -> Vec<Record> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for (index, item) in document.select(&self.item_selector).enumerate() {
            let Some(id) = self.resolve_id(&item) else {
                log::debug!("Skipping item {index}: no usable identifier");
                continue;
            };

            // insert() returning false means we already examined this item.
            if !state.seen_ids.insert(id.clone()) {
                continue;
            }

            let metric_value = self.read_metric(&item);
            if metric_value < state.threshold {
                log::debug!(
                    "Item {id} below threshold ({metric_value} < {})",
                    state.threshold
                );
                continue;
            }

            let order = state.claim_discovery_order();
            records.push(Record::new(id, metric_value, format!("item[{index}]"), order));
        }

        records
    }

    /// Resolve the identifier on the element itself, else on the first
    /// ancestor carrying the attribute. Rejects non-matching values.
    fn resolve_id(&self, item: &ElementRef) -> Option<String> {
        let raw = item.value().attr(&self.id_attr).or_else(|| {
            item.ancestors()
                .filter_map(ElementRef::wrap)
                .find_map(|el| el.value().attr(&self.id_attr))
        })?;

        if self.id_pattern.is_match(raw) {
            Some(raw.to_string())
        } else {
            None
        }
    }

    /// Find the labeled metric control and parse its count.
    ///
    /// Labels are checked independently in table order; the first structural
    /// match wins. Missing control or digits yields zero.
    fn read_metric(&self, item: &ElementRef) -> u64 {
        for label in &self.metric_labels {
            for control in item.select(&self.control_selector) {
                let text: String = control.text().collect();
                if text.contains(label.as_str()) {
                    return self.parse_count(&text);
                }
            }
        }
        0
    }

    /// Parse the first run of digits after stripping locale thousands
    /// separators and whitespace.
    fn parse_count(&self, text: &str) -> u64 {
        let stripped: String = text
            .chars()
            .filter(|c| !matches!(c, ',' | '.' | '\u{00a0}' | '\u{202f}') && !c.is_whitespace())
            .collect();
        self.digits
            .find(&stripped)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
