// src/driver.rs

//! Scroll/validate/extract state machine.
//!
//! The driver is advanced by a single external tick; all waits are fixed
//! deadlines compared against the caller-supplied instant, so the whole
//! cycle runs on simulated time in tests. A tick is a no-op while paused,
//! failed, or while a wait deadline is pending, which is the sole mechanism
//! preventing overlapping scroll commands.

use std::time::{Duration, Instant};

use crate::invoker::LoadMoreInvoker;
use crate::models::{DriverConfig, FailureReason, ScanState};
use crate::page::FeedPage;
use crate::probe::FeedProbe;
use crate::store::ResultStore;
use crate::watcher::ChangeWatcher;

/// Driver phase. Suspension points are the transitions into `Scrolling`
/// (waiting out the detection delay) and `AwaitingRetry` (backoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scrolling,
    Validating,
    AwaitingRetry,
    Paused,
    Failed,
}

/// Pre-scroll geometry used by validation.
#[derive(Debug, Clone, Copy)]
struct ScrollSnapshot {
    position: f64,
    extent: f64,
}

/// Everything a tick operates on. The driver is the only writer of
/// `state` and `store` for the duration of the call.
pub struct CycleContext<'a> {
    pub page: &'a mut dyn FeedPage,
    pub watcher: &'a mut dyn ChangeWatcher,
    pub probe: &'a FeedProbe,
    pub invoker: &'a LoadMoreInvoker,
    pub store: &'a mut ResultStore,
    pub state: &'a mut ScanState,
}

/// Orchestrates scroll→validate→extract cycles with bounded retry.
pub struct ScrollDriver {
    config: DriverConfig,
    phase: Phase,
    resume_at: Option<Instant>,
    snapshot: Option<ScrollSnapshot>,
    via_load_more: bool,
}

impl ScrollDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            resume_at: None,
            snapshot: None,
            via_load_more: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance the state machine. Returns whether anything happened.
    pub fn tick(&mut self, now: Instant, cx: &mut CycleContext) -> bool {
        if cx.state.paused || cx.state.terminal_failure {
            return false;
        }

        // Pick up async content arrival before deciding anything.
        cx.watcher.observe(cx.page, cx.state);

        match self.phase {
            Phase::Idle => {
                self.begin_cycle(now, cx);
                true
            }
            Phase::Scrolling => {
                if self.waiting(now) {
                    return false;
                }
                if self.via_load_more {
                    self.finish_load_more(cx);
                } else {
                    self.phase = Phase::Validating;
                    self.validate(now, cx);
                }
                true
            }
            Phase::Validating => {
                self.validate(now, cx);
                true
            }
            Phase::AwaitingRetry => {
                if self.waiting(now) {
                    return false;
                }
                self.begin_cycle(now, cx);
                true
            }
            Phase::Paused | Phase::Failed => false,
        }
    }

    /// Pause on explicit user request.
    pub fn pause(&mut self, state: &mut ScanState) {
        state.paused = true;
        self.phase = Phase::Paused;
        self.resume_at = None;
        log::info!("Driver paused");
    }

    /// Leave `Paused` or `Failed`. Retry count and failure flags are
    /// cleared; collected records and seen ids are untouched.
    pub fn resume(&mut self, state: &mut ScanState) {
        state.resume();
        self.phase = Phase::Idle;
        self.resume_at = None;
        self.snapshot = None;
        self.via_load_more = false;
        log::info!("Driver resumed");
    }

    fn waiting(&self, now: Instant) -> bool {
        self.resume_at.is_some_and(|deadline| now < deadline)
    }

    /// The Scrolling step: load-more short-circuit, else snapshot and scroll.
    fn begin_cycle(&mut self, now: Instant, cx: &mut CycleContext) {
        // Global ceiling bounds unattended runtime, independent of retries.
        if cx.state.scroll_count >= self.config.max_scrolls {
            self.pause_at_ceiling(cx.state);
            return;
        }

        if cx.invoker.invoke(cx.page) {
            self.via_load_more = true;
            self.snapshot = None;
            self.resume_at = Some(now + Duration::from_millis(self.config.post_load_delay_ms));
            self.phase = Phase::Scrolling;
            return;
        }

        let metrics = cx.page.metrics();
        self.snapshot = Some(ScrollSnapshot {
            position: metrics.position,
            extent: metrics.extent,
        });
        cx.page.scroll_to_bottom();
        cx.state.scroll_count += 1;
        self.via_load_more = false;
        self.resume_at = Some(now + Duration::from_millis(self.config.detect_delay_ms));
        self.phase = Phase::Scrolling;
    }

    /// Load-more content has had its delay; extract and go idle.
    fn finish_load_more(&mut self, cx: &mut CycleContext) {
        cx.watcher.observe(cx.page, cx.state);
        // The consumed flag counts as this cycle's progress signal.
        cx.state.take_growth_flag();
        cx.state.retry_count = 0;
        self.run_probe(cx);
        self.go_idle();
    }

    fn validate(&mut self, now: Instant, cx: &mut CycleContext) {
        let metrics = cx.page.metrics();
        let snapshot = self.snapshot.take().unwrap_or(ScrollSnapshot {
            position: metrics.position,
            extent: metrics.extent,
        });

        // The growth flag is consumed exactly once per validation, even
        // when extent or position alone would already prove progress.
        let content_arrived = cx.state.take_growth_flag();
        let extent_grew = metrics.extent - snapshot.extent > self.config.extent_tolerance_px;
        let moved = (metrics.position - snapshot.position).abs() > self.config.position_tolerance_px;

        if extent_grew || moved || content_arrived {
            cx.state.retry_count = 0;
            self.run_probe(cx);
            self.go_idle();
            return;
        }

        let near_bottom = metrics.distance_to_bottom() <= self.config.bottom_margin_px;
        if near_bottom {
            if cx.invoker.invoke(cx.page) {
                self.via_load_more = true;
                self.resume_at = Some(now + Duration::from_millis(self.config.post_load_delay_ms));
                self.phase = Phase::Scrolling;
                return;
            }
            cx.state.retry_count += 1;
            if cx.state.retry_count >= self.config.max_retries {
                self.fail(cx.state, FailureReason::EndOfFeed);
            } else {
                log::debug!(
                    "Stall at bottom, retry {}/{}",
                    cx.state.retry_count,
                    self.config.max_retries
                );
                self.resume_at = Some(now + Duration::from_millis(self.config.retry_backoff_ms));
                self.phase = Phase::AwaitingRetry;
            }
            return;
        }

        // Mid-feed stall: count it, but still harvest whatever is visible.
        cx.state.retry_count += 1;
        self.run_probe(cx);
        if cx.state.retry_count >= self.config.max_retries {
            self.fail(cx.state, FailureReason::ScrollStall);
        } else {
            self.go_idle();
        }
    }

    fn run_probe(&self, cx: &mut CycleContext) {
        let html = cx.page.document_html();
        let records = cx.probe.extract(&html, cx.state);
        for record in records {
            let id = record.id.clone();
            if cx.store.add_if_new(record) {
                log::info!("Collected {id}");
            }
        }
    }

    fn go_idle(&mut self) {
        self.phase = Phase::Idle;
        self.resume_at = None;
        self.snapshot = None;
        self.via_load_more = false;
    }

    fn pause_at_ceiling(&mut self, state: &mut ScanState) {
        state.paused = true;
        self.phase = Phase::Paused;
        self.resume_at = None;
        log::warn!(
            "Scroll ceiling reached ({} scrolls, {} retries pending); pausing",
            state.scroll_count,
            state.retry_count
        );
    }

    fn fail(&mut self, state: &mut ScanState, reason: FailureReason) {
        state.terminal_failure = true;
        state.last_failure = Some(reason);
        self.phase = Phase::Failed;
        self.resume_at = None;
        match reason {
            FailureReason::EndOfFeed => {
                log::error!("No more content and no load-more control; giving up")
            }
            FailureReason::ScrollStall => {
                log::error!("Scroll produced no progress after retries; giving up")
            }
        }
    }
}
