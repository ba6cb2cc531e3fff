// src/aggregator.rs
//! Result accumulation for one in-flight streaming search.
//!
//! The accumulator is created fresh per search call and owned exclusively by
//! its read loop; it is never shared across calls. The progress sink runs
//! synchronously on the same call stack as event processing, so the caller
//! observes every update strictly before the search returns.

use serde_json::Value;

use crate::error::SearchError;
use crate::types::{ProgressUpdate, SearchResults, StreamEvent};

/// What the read loop should do after an event is applied.
#[derive(Debug)]
pub enum StepOutcome {
    /// Keep reading.
    Continue,
    /// A `complete` event arrived; stop reading and return these results.
    Finished(SearchResults),
}

/// Per-call accumulator implementing the merge and ordering rules.
///
/// Ordering invariant: the perfect-burst matches (if any) come first, in
/// burst order, followed by progressive matches in arrival order. A
/// `complete` event overrides the accumulated list with the backend's
/// authoritative one.
#[derive(Default)]
pub struct Accumulator {
    all_matches: Vec<Value>,
    perfect_matches: Vec<Value>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one stream event, notifying the sink for non-terminal events.
    ///
    /// A second perfect burst replaces the first; the backend is not
    /// expected to send one, but being permissive here costs nothing.
    pub fn apply(
        &mut self,
        event: StreamEvent,
        sink: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<StepOutcome, SearchError> {
        match event {
            StreamEvent::PerfectBurst { matches, .. } => {
                self.perfect_matches = matches;
                self.all_matches = self.perfect_matches.clone();
                sink(ProgressUpdate::Perfect {
                    matches: self.perfect_matches.clone(),
                    total: self.all_matches.len(),
                });
                Ok(StepOutcome::Continue)
            }
            StreamEvent::Progressive { record } => {
                self.all_matches.push(record.clone());
                sink(ProgressUpdate::Progressive {
                    record,
                    total: self.all_matches.len(),
                });
                Ok(StepOutcome::Continue)
            }
            StreamEvent::Complete {
                total_matches,
                matches,
                expanded_terms,
                search_time_ms,
            } => {
                let matches = matches.unwrap_or_else(|| std::mem::take(&mut self.all_matches));
                Ok(StepOutcome::Finished(SearchResults {
                    total_matches,
                    matches,
                    expanded_terms: expanded_terms.unwrap_or_default(),
                    search_time_ms,
                }))
            }
            StreamEvent::Error { error } => Err(SearchError::Stream(error)),
        }
    }

    /// Best-effort results for a stream that ended without a `complete` line.
    pub fn into_partial_results(self) -> SearchResults {
        SearchResults {
            total_matches: self.all_matches.len(),
            matches: self.all_matches,
            expanded_terms: Vec::new(),
            search_time_ms: None,
        }
    }
}
