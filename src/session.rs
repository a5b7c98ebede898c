// src/session.rs

//! Scan session: activation, ownership, and user actions.
//!
//! A session is explicitly constructed and owned by its caller; there is no
//! process-wide singleton. Activation verifies the document location before
//! any state exists.

use std::time::Instant;

use url::Url;

use crate::driver::{CycleContext, Phase, ScrollDriver};
use crate::error::{AppError, Result};
use crate::invoker::LoadMoreInvoker;
use crate::models::{Config, FailureReason, LocaleConfig, Record, ScanState};
use crate::page::FeedPage;
use crate::probe::FeedProbe;
use crate::render::Renderer;
use crate::storage::prefs::{PrefStore, THRESHOLD_KEY};
use crate::store::ResultStore;
use crate::watcher::{self, ChangeWatcher};

/// One automation session over a single feed page.
pub struct ScanSession<P: FeedPage> {
    page: P,
    config: Config,
    locale: LocaleConfig,
    probe: FeedProbe,
    invoker: LoadMoreInvoker,
    watcher: Box<dyn ChangeWatcher>,
    driver: ScrollDriver,
    store: ResultStore,
    state: ScanState,
    renderer: Box<dyn Renderer>,
    prefs: Box<dyn PrefStore>,
    stopped: bool,
}

impl<P: FeedPage> ScanSession<P> {
    /// Activation entry point.
    ///
    /// Verifies the document location matches the expected feed context and
    /// aborts with [`AppError::EnvironmentMismatch`] before creating any
    /// state when it does not. The stored threshold preference is loaded
    /// here; an unavailable store silently yields the configured default.
    pub fn activate(
        page: P,
        config: Config,
        locale: LocaleConfig,
        renderer: Box<dyn Renderer>,
        prefs: Box<dyn PrefStore>,
    ) -> Result<Self> {
        config.validate()?;
        Self::check_location(&page, &config, &locale)?;

        let threshold = prefs
            .get(THRESHOLD_KEY)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| config.thresholds.allowed.contains(v))
            .unwrap_or(config.thresholds.initial);

        let watcher = watcher::for_page(&page, &config)?;
        let probe = FeedProbe::new(&config, &locale)?;
        let invoker = LoadMoreInvoker::new(&locale);
        let driver = ScrollDriver::new(config.driver.clone());
        let state = ScanState::new(threshold);

        let session = Self {
            page,
            config,
            locale,
            probe,
            invoker,
            watcher,
            driver,
            store: ResultStore::new(),
            state,
            renderer,
            prefs,
            stopped: false,
        };
        session.render();
        Ok(session)
    }

    fn check_location(page: &P, config: &Config, locale: &LocaleConfig) -> Result<()> {
        let location = page.location();
        let expected = format!(
            "{}{}",
            config.feed.expected_host, config.feed.feed_path_prefix
        );

        let matches = Url::parse(&location)
            .ok()
            .is_some_and(|url| {
                url.host_str() == Some(config.feed.expected_host.as_str())
                    && url.path().starts_with(&config.feed.feed_path_prefix)
            });
        if matches {
            Ok(())
        } else {
            log::error!(
                "{}",
                locale.messages.wrong_page.replace("{url}", &location)
            );
            Err(AppError::environment(expected, location))
        }
    }

    /// Advance the scan by one tick. No-op after `stop()`.
    pub fn tick(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        let mut cx = CycleContext {
            page: &mut self.page,
            watcher: &mut *self.watcher,
            probe: &self.probe,
            invoker: &self.invoker,
            store: &mut self.store,
            state: &mut self.state,
        };
        if self.driver.tick(now, &mut cx) {
            self.render();
        }
    }

    pub fn pause(&mut self) {
        self.driver.pause(&mut self.state);
        self.render();
    }

    /// Resume from `Paused` or `Failed`. Records and seen ids survive.
    pub fn resume(&mut self) {
        self.driver.resume(&mut self.state);
        log::info!("{}", self.locale.messages.resumed);
        self.render();
    }

    /// Select a new threshold, persisting it on success.
    ///
    /// Values outside the allowed set are rejected and the previous value
    /// retained. Non-retroactive: already collected records stay put.
    pub fn set_threshold(&mut self, value: u64) -> bool {
        let applied = self
            .state
            .set_threshold(value, &self.config.thresholds.allowed);
        if applied {
            self.prefs.set(THRESHOLD_KEY, &value.to_string());
        } else {
            log::warn!("Rejected threshold {value}; keeping {}", self.state.threshold);
        }
        self.render();
        applied
    }

    /// Stop the session: future ticks become no-ops, the watcher is gone on
    /// drop, and collected records stay available until cleared.
    pub fn stop(&mut self) {
        self.stopped = true;
        log::info!("Session stopped with {} records", self.store.len());
    }

    /// Explicitly drop collected records.
    pub fn clear_records(&mut self) {
        self.store.clear();
        self.render();
    }

    pub fn records(&self) -> &[Record] {
        self.store.snapshot()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.driver.phase()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Text export of the collected records.
    pub fn export_text(&self) -> String {
        crate::export::to_text(
            self.store.snapshot(),
            &self.config.feed.post_url_prefix,
            &self.locale.phrases.metric_unit,
        )
    }

    /// Tabular export of the collected records.
    pub fn export_table(&self) -> String {
        crate::export::to_table(self.store.snapshot(), &self.config.feed.post_url_prefix)
    }

    /// Raw fallback lines for export failures.
    pub fn raw_lines(&self) -> Vec<String> {
        crate::export::raw_lines(self.store.snapshot(), &self.config.feed.post_url_prefix)
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    /// Operator-facing status line for the current state.
    pub fn status_text(&self) -> String {
        let messages = &self.locale.messages;
        if self.state.terminal_failure {
            match self.state.last_failure {
                Some(FailureReason::EndOfFeed) => messages.failed_end_of_feed.clone(),
                _ => messages
                    .failed_stall
                    .replace("{retries}", &self.state.retry_count.to_string()),
            }
        } else if self.state.paused {
            messages.paused.clone()
        } else {
            messages.scanning.clone()
        }
    }

    fn render(&self) {
        self.renderer
            .render(&self.state, self.store.snapshot(), &self.status_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{FeedScript, FeedSegment, ScriptedPage};
    use crate::render::NullRenderer;
    use crate::storage::prefs::MemoryStore;
    use std::time::Duration;

    fn feed_page(location: &str, metrics: &[u64]) -> ScriptedPage {
        let segments = metrics
            .iter()
            .enumerate()
            .map(|(i, m)| FeedSegment {
                html: format!(
                    "<div data-id=\"urn:li:activity:{i}\"><button>{m} comments</button></div>"
                ),
                height: 1000.0,
                load_more_label: None,
                activation_fails: false,
            })
            .collect();
        ScriptedPage::new(FeedScript {
            location: location.into(),
            viewport: 400.0,
            segments,
            mutation_events: true,
        })
    }

    fn activate(page: ScriptedPage) -> ScanSession<ScriptedPage> {
        ScanSession::activate(
            page,
            Config::default(),
            LocaleConfig::default(),
            Box::new(NullRenderer),
            Box::new(MemoryStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_activation_rejects_wrong_page() {
        let page = feed_page("https://example.com/other", &[100]);
        let result = ScanSession::activate(
            page,
            Config::default(),
            LocaleConfig::default(),
            Box::new(NullRenderer),
            Box::new(MemoryStore::new()),
        );
        assert!(matches!(
            result.err(),
            Some(AppError::EnvironmentMismatch { .. })
        ));
    }

    #[test]
    fn test_threshold_preference_loaded_when_valid() {
        let prefs = MemoryStore::new();
        prefs.set(THRESHOLD_KEY, "250");
        let session = ScanSession::activate(
            feed_page("https://www.linkedin.com/feed/", &[100]),
            Config::default(),
            LocaleConfig::default(),
            Box::new(NullRenderer),
            Box::new(prefs),
        )
        .unwrap();
        assert_eq!(session.state().threshold, 250);
    }

    #[test]
    fn test_garbage_preference_falls_back_to_default() {
        let prefs = MemoryStore::new();
        prefs.set(THRESHOLD_KEY, "not-a-number");
        let session = ScanSession::activate(
            feed_page("https://www.linkedin.com/feed/", &[100]),
            Config::default(),
            LocaleConfig::default(),
            Box::new(NullRenderer),
            Box::new(prefs),
        )
        .unwrap();
        assert_eq!(session.state().threshold, 100);
    }

    #[test]
    fn test_invalid_threshold_change_retains_previous() {
        let mut session = activate(feed_page("https://www.linkedin.com/feed/", &[100]));
        assert!(!session.set_threshold(123));
        assert_eq!(session.state().threshold, 100);
        assert!(session.set_threshold(500));
        assert_eq!(session.state().threshold, 500);
    }

    #[test]
    fn test_threshold_change_is_not_retroactive() {
        let mut session = activate(feed_page(
            "https://www.linkedin.com/feed/",
            &[250, 300],
        ));
        let mut now = Instant::now();
        for _ in 0..4 {
            now += Duration::from_millis(60_000);
            session.tick(now);
        }
        assert_eq!(session.records().len(), 2);

        // Raising the threshold leaves collected records in place.
        session.set_threshold(1000);
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn test_stop_preserves_records_and_blocks_ticks() {
        let mut session = activate(feed_page(
            "https://www.linkedin.com/feed/",
            &[250, 300],
        ));
        let mut now = Instant::now();
        for _ in 0..4 {
            now += Duration::from_millis(60_000);
            session.tick(now);
        }
        let collected = session.records().len();
        assert!(collected > 0);

        session.stop();
        let scrolls = session.state().scroll_count;
        now += Duration::from_millis(60_000);
        session.tick(now);
        assert_eq!(session.state().scroll_count, scrolls);
        assert_eq!(session.records().len(), collected);
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut session = activate(feed_page("https://www.linkedin.com/feed/", &[250]));
        session.pause();
        assert!(session.state().paused);
        assert_eq!(session.phase(), Phase::Paused);

        session.resume();
        assert!(!session.state().paused);
        assert_eq!(session.phase(), Phase::Idle);
    }
}
