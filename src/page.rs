// src/page.rs

//! Live document surface the agent drives.
//!
//! The core never talks to a browser directly; it goes through [`FeedPage`].
//! The crate ships [`ScriptedPage`], a replay implementation backed by a
//! serde-loadable script, used by the CLI runner and the tests. Real-browser
//! bindings are an integrator concern.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Scroll geometry of the document at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Current scroll position (top of the viewport)
    pub position: f64,
    /// Total scrollable height of the document
    pub extent: f64,
    /// Viewport height
    pub viewport: f64,
}

impl PageMetrics {
    /// Distance between the bottom of the viewport and the end of the extent.
    pub fn distance_to_bottom(&self) -> f64 {
        (self.extent - (self.position + self.viewport)).max(0.0)
    }
}

/// A visible control found by the page's class/role scan.
#[derive(Debug, Clone)]
pub struct ControlCandidate {
    /// Index the page uses to activate this control
    pub index: usize,
    /// Visible text of the control
    pub text: String,
}

/// The document surface the scroll driver operates on.
pub trait FeedPage {
    /// Current document location (full URL).
    fn location(&self) -> String;

    /// Current scroll geometry.
    fn metrics(&self) -> PageMetrics;

    /// Issue a scroll-to-bottom command.
    fn scroll_to_bottom(&mut self);

    /// Snapshot of the currently rendered document.
    fn document_html(&self) -> String;

    /// Candidate load-more controls, scanned by class/role.
    fn load_more_candidates(&self) -> Vec<ControlCandidate>;

    /// Activate a previously returned candidate. May fail.
    fn activate_load_more(&mut self, index: usize) -> Result<()>;

    /// Whether the page can report structural mutation events.
    fn supports_mutation_events(&self) -> bool;

    /// Drain HTML fragments of subtrees inserted since the last call.
    ///
    /// Always empty when [`supports_mutation_events`](Self::supports_mutation_events)
    /// is false.
    fn drain_insertions(&mut self) -> Vec<String>;
}

/// One chunk of feed content revealed during a replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSegment {
    /// Item markup appended to the document when this segment is revealed
    pub html: String,

    /// Pixel height this segment adds to the extent
    pub height: f64,

    /// When set, the segment is gated behind a control with this visible text
    #[serde(default)]
    pub load_more_label: Option<String>,

    /// Simulate a control whose activation throws
    #[serde(default)]
    pub activation_fails: bool,
}

/// Serde-loadable script describing a replayable feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedScript {
    /// Document location reported to the activation check
    pub location: String,

    /// Viewport height
    pub viewport: f64,

    /// Segments in reveal order; the first is visible at start
    pub segments: Vec<FeedSegment>,

    /// Whether the page reports mutation events
    #[serde(default = "default_true")]
    pub mutation_events: bool,
}

fn default_true() -> bool {
    true
}

impl FeedScript {
    /// Load a script from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// In-memory feed replay driven by a [`FeedScript`].
///
/// Scrolling to the bottom reveals the next ungated segment; gated segments
/// require activating their control. An exhausted script stalls, which is
/// how end-of-feed behavior is exercised.
pub struct ScriptedPage {
    script: FeedScript,
    revealed: usize,
    position: f64,
    insertions: Vec<String>,
}

impl ScriptedPage {
    pub fn new(script: FeedScript) -> Self {
        // The first segment counts as rendered at load, not inserted.
        let revealed = if script.segments.is_empty() { 0 } else { 1 };
        Self {
            script,
            revealed,
            position: 0.0,
            insertions: Vec::new(),
        }
    }

    /// Load a page directly from a script file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FeedScript::load(path)?))
    }

    /// Whether every segment has been revealed.
    pub fn is_exhausted(&self) -> bool {
        self.revealed >= self.script.segments.len()
    }

    fn extent(&self) -> f64 {
        let content: f64 = self.script.segments[..self.revealed]
            .iter()
            .map(|s| s.height)
            .sum();
        content.max(self.script.viewport)
    }

    fn next_segment(&self) -> Option<&FeedSegment> {
        self.script.segments.get(self.revealed)
    }

    fn reveal_next(&mut self) {
        if let Some(segment) = self.script.segments.get(self.revealed) {
            self.insertions.push(segment.html.clone());
            self.revealed += 1;
        }
    }
}

impl FeedPage for ScriptedPage {
    fn location(&self) -> String {
        self.script.location.clone()
    }

    fn metrics(&self) -> PageMetrics {
        PageMetrics {
            position: self.position,
            extent: self.extent(),
            viewport: self.script.viewport,
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.position = (self.extent() - self.script.viewport).max(0.0);
        // Ungated segments arrive in response to reaching the bottom.
        if self
            .next_segment()
            .is_some_and(|s| s.load_more_label.is_none())
        {
            self.reveal_next();
        }
    }

    fn document_html(&self) -> String {
        let body: String = self.script.segments[..self.revealed]
            .iter()
            .map(|s| s.html.as_str())
            .collect();
        format!("<main>{body}</main>")
    }

    fn load_more_candidates(&self) -> Vec<ControlCandidate> {
        match self.next_segment().and_then(|s| s.load_more_label.as_ref()) {
            Some(label) => vec![ControlCandidate {
                index: 0,
                text: label.clone(),
            }],
            None => Vec::new(),
        }
    }

    fn activate_load_more(&mut self, index: usize) -> Result<()> {
        let gated = self
            .next_segment()
            .is_some_and(|s| s.load_more_label.is_some());
        if index != 0 || !gated {
            return Err(AppError::activation(
                "scripted page",
                format!("no load-more control at index {index}"),
            ));
        }
        if self.next_segment().is_some_and(|s| s.activation_fails) {
            return Err(AppError::activation(
                "scripted page",
                "control activation threw",
            ));
        }
        self.reveal_next();
        Ok(())
    }

    fn supports_mutation_events(&self) -> bool {
        self.script.mutation_events
    }

    fn drain_insertions(&mut self) -> Vec<String> {
        if !self.script.mutation_events {
            return Vec::new();
        }
        std::mem::take(&mut self.insertions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> String {
        format!("<div data-id=\"urn:li:activity:{id}\"><span>{id} comments</span></div>")
    }

    fn two_segment_script() -> FeedScript {
        FeedScript {
            location: "https://www.linkedin.com/feed/".into(),
            viewport: 800.0,
            segments: vec![
                FeedSegment {
                    html: item(1),
                    height: 1200.0,
                    load_more_label: None,
                    activation_fails: false,
                },
                FeedSegment {
                    html: item(2),
                    height: 1200.0,
                    load_more_label: None,
                    activation_fails: false,
                },
            ],
            mutation_events: true,
        }
    }

    #[test]
    fn test_scroll_reveals_next_segment() {
        let mut page = ScriptedPage::new(two_segment_script());
        let before = page.metrics().extent;
        page.scroll_to_bottom();
        assert!(page.metrics().extent > before);
        assert_eq!(page.drain_insertions().len(), 1);
        assert!(page.is_exhausted());
    }

    #[test]
    fn test_exhausted_script_stalls() {
        let mut page = ScriptedPage::new(two_segment_script());
        page.scroll_to_bottom();
        let extent = page.metrics().extent;
        page.drain_insertions();

        page.scroll_to_bottom();
        assert_eq!(page.metrics().extent, extent);
        assert!(page.drain_insertions().is_empty());
    }

    #[test]
    fn test_gated_segment_needs_activation() {
        let mut script = two_segment_script();
        script.segments[1].load_more_label = Some("Show new posts".into());
        let mut page = ScriptedPage::new(script);

        page.scroll_to_bottom();
        assert!(!page.is_exhausted());

        let candidates = page.load_more_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Show new posts");

        page.activate_load_more(0).unwrap();
        assert!(page.is_exhausted());
    }

    #[test]
    fn test_activation_failure_reported() {
        let mut script = two_segment_script();
        script.segments[1].load_more_label = Some("Show new posts".into());
        script.segments[1].activation_fails = true;
        let mut page = ScriptedPage::new(script);

        page.scroll_to_bottom();
        assert!(page.activate_load_more(0).is_err());
    }

    #[test]
    fn test_no_mutation_events_when_disabled() {
        let mut script = two_segment_script();
        script.mutation_events = false;
        let mut page = ScriptedPage::new(script);
        assert!(!page.supports_mutation_events());
        page.scroll_to_bottom();
        assert!(page.drain_insertions().is_empty());
    }
}
