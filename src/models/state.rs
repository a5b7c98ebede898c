// src/models/state.rs

//! Per-session scan state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Why the driver reached the `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// No progress while not at the bottom of the feed
    ScrollStall,
    /// At the bottom with no load-more control, retries exhausted
    EndOfFeed,
}

/// Mutable state of one scan session.
///
/// Created once per session and mutated only by the scroll driver and
/// explicit user actions (pause/resume/threshold change). There is exactly
/// one logical writer at any time, so no locking is involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanState {
    /// Scroll commands issued so far
    pub scroll_count: u32,

    /// Consecutive no-progress validations
    pub retry_count: u32,

    /// Set while the session is paused (user action or scroll ceiling)
    pub paused: bool,

    /// Set when the driver reached the terminal `Failed` state
    pub terminal_failure: bool,

    /// One-shot flag set by the change watcher, consumed by validation
    pub content_growth_flag: bool,

    /// Current metric threshold; gates future insertions only
    pub threshold: u64,

    /// Identifiers already examined, including below-threshold ones
    pub seen_ids: HashSet<String>,

    /// Next discovery order to assign
    pub next_discovery_order: u32,

    /// Reason for the most recent terminal failure, if any
    pub last_failure: Option<FailureReason>,
}

impl ScanState {
    /// Create a fresh state with the given starting threshold.
    pub fn new(threshold: u64) -> Self {
        Self {
            scroll_count: 0,
            retry_count: 0,
            paused: false,
            terminal_failure: false,
            content_growth_flag: false,
            threshold,
            seen_ids: HashSet::new(),
            next_discovery_order: 0,
            last_failure: None,
        }
    }

    /// Change the threshold if `value` is a member of the allowed set.
    ///
    /// Any other value is rejected and the previous threshold retained.
    /// Returns whether the change was applied. Non-retroactive: already
    /// collected records are unaffected.
    pub fn set_threshold(&mut self, value: u64, allowed: &[u64]) -> bool {
        if allowed.contains(&value) {
            self.threshold = value;
            true
        } else {
            false
        }
    }

    /// Consume the one-shot content growth flag.
    pub fn take_growth_flag(&mut self) -> bool {
        std::mem::take(&mut self.content_growth_flag)
    }

    /// Claim the next discovery order value.
    pub fn claim_discovery_order(&mut self) -> u32 {
        let order = self.next_discovery_order;
        self.next_discovery_order += 1;
        order
    }

    /// Leave `Paused`/`Failed`: clear retry count and failure flags.
    ///
    /// Collected records and `seen_ids` are preserved.
    pub fn resume(&mut self) {
        self.paused = false;
        self.terminal_failure = false;
        self.retry_count = 0;
        self.last_failure = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[u64] = &[0, 10, 25, 50, 100, 250, 500, 1000];

    #[test]
    fn test_set_threshold_accepts_member() {
        let mut state = ScanState::new(100);
        assert!(state.set_threshold(250, ALLOWED));
        assert_eq!(state.threshold, 250);
    }

    #[test]
    fn test_set_threshold_rejects_and_retains() {
        let mut state = ScanState::new(100);
        assert!(!state.set_threshold(123, ALLOWED));
        assert_eq!(state.threshold, 100);
    }

    #[test]
    fn test_growth_flag_is_one_shot() {
        let mut state = ScanState::new(0);
        state.content_growth_flag = true;
        assert!(state.take_growth_flag());
        assert!(!state.take_growth_flag());
    }

    #[test]
    fn test_resume_clears_failure_but_keeps_seen_ids() {
        let mut state = ScanState::new(0);
        state.seen_ids.insert("urn:li:activity:1".into());
        state.retry_count = 3;
        state.terminal_failure = true;
        state.last_failure = Some(FailureReason::ScrollStall);

        state.resume();

        assert_eq!(state.retry_count, 0);
        assert!(!state.terminal_failure);
        assert!(state.last_failure.is_none());
        assert_eq!(state.seen_ids.len(), 1);
    }
}
