// src/invoker.rs

//! Load-more control activation.

use crate::models::LocaleConfig;
use crate::page::FeedPage;

/// Finds and activates a localized "fetch more" control.
///
/// Candidates come from the page's class/role scan; their visible text is
/// matched by substring against the ordered phrase table. The first matching
/// phrase wins, regardless of which language it belongs to.
pub struct LoadMoreInvoker {
    phrases: Vec<String>,
}

impl LoadMoreInvoker {
    pub fn new(locale: &LocaleConfig) -> Self {
        Self {
            phrases: locale.phrases.load_more.clone(),
        }
    }

    /// Activate a matching control if one is present.
    ///
    /// Returns whether a control was activated. Activation failures are
    /// logged and reported as `false`, never raised.
    pub fn invoke(&self, page: &mut dyn FeedPage) -> bool {
        let candidates = page.load_more_candidates();
        if candidates.is_empty() {
            return false;
        }

        for phrase in &self.phrases {
            for candidate in &candidates {
                if !candidate.text.contains(phrase.as_str()) {
                    continue;
                }
                return match page.activate_load_more(candidate.index) {
                    Ok(()) => {
                        log::info!("Activated load-more control: {:?}", candidate.text);
                        true
                    }
                    Err(e) => {
                        log::warn!(
                            "Load-more control {:?} failed to activate: {e}",
                            candidate.text
                        );
                        false
                    }
                };
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{FeedScript, FeedSegment, ScriptedPage};

    fn gated_page(label: &str, activation_fails: bool) -> ScriptedPage {
        ScriptedPage::new(FeedScript {
            location: "https://www.linkedin.com/feed/".into(),
            viewport: 800.0,
            segments: vec![
                FeedSegment {
                    html: "<div data-id=\"urn:li:activity:1\"></div>".into(),
                    height: 1000.0,
                    load_more_label: None,
                    activation_fails: false,
                },
                FeedSegment {
                    html: "<div data-id=\"urn:li:activity:2\"></div>".into(),
                    height: 1000.0,
                    load_more_label: Some(label.into()),
                    activation_fails,
                },
            ],
            mutation_events: true,
        })
    }

    #[test]
    fn test_matching_phrase_activates_control() {
        let mut page = gated_page("Show new posts", false);
        let invoker = LoadMoreInvoker::new(&LocaleConfig::default());
        assert!(invoker.invoke(&mut page));
        assert!(page.is_exhausted());
    }

    #[test]
    fn test_unmatched_text_returns_false() {
        let mut page = gated_page("Nothing matches", false);
        let invoker = LoadMoreInvoker::new(&LocaleConfig::default());
        assert!(!invoker.invoke(&mut page));
        assert!(!page.is_exhausted());
    }

    #[test]
    fn test_activation_failure_is_false_not_error() {
        let mut page = gated_page("Load more", true);
        let invoker = LoadMoreInvoker::new(&LocaleConfig::default());
        assert!(!invoker.invoke(&mut page));
    }

    #[test]
    fn test_no_candidates_returns_false() {
        let mut page = gated_page("Load more", false);
        // Consume the gated segment, leaving no candidates behind.
        let invoker = LoadMoreInvoker::new(&LocaleConfig::default());
        assert!(invoker.invoke(&mut page));
        assert!(!invoker.invoke(&mut page));
    }
}
