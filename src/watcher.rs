// src/watcher.rs

//! Structural change detection.
//!
//! Watches insertion notifications from the page and raises the one-shot
//! content growth flag on `ScanState` when an inserted subtree is, or
//! contains, a feed item. Pages without mutation events get a no-op watcher;
//! validation then relies on extent/position comparison alone.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, ScanState};
use crate::page::FeedPage;

/// Observes structural changes to the feed container.
pub trait ChangeWatcher {
    /// Poll the page for inserted subtrees and update the growth flag.
    fn observe(&mut self, page: &mut dyn FeedPage, state: &mut ScanState);
}

/// Watcher backed by the page's mutation events.
pub struct MutationWatcher {
    item_selector: Selector,
}

impl MutationWatcher {
    pub fn new(config: &Config) -> Result<Self> {
        let item_selector = Selector::parse(&config.selectors.item_selector)
            .map_err(|e| AppError::selector(&config.selectors.item_selector, format!("{e:?}")))?;
        Ok(Self { item_selector })
    }
}

impl ChangeWatcher for MutationWatcher {
    fn observe(&mut self, page: &mut dyn FeedPage, state: &mut ScanState) {
        for fragment in page.drain_insertions() {
            let parsed = Html::parse_fragment(&fragment);
            if parsed.select(&self.item_selector).next().is_some() {
                log::debug!("Mutation watcher: item content arrived");
                state.content_growth_flag = true;
            }
        }
    }
}

/// Fallback when the page lacks mutation events. Never raises the flag.
pub struct NoopWatcher;

impl ChangeWatcher for NoopWatcher {
    fn observe(&mut self, _page: &mut dyn FeedPage, _state: &mut ScanState) {}
}

/// Pick a watcher for the page's capabilities. Absence of mutation events
/// is not a fatal condition.
pub fn for_page(page: &dyn FeedPage, config: &Config) -> Result<Box<dyn ChangeWatcher>> {
    if page.supports_mutation_events() {
        Ok(Box::new(MutationWatcher::new(config)?))
    } else {
        log::info!("Mutation events unavailable; relying on extent comparison");
        Ok(Box::new(NoopWatcher))
    }
}
