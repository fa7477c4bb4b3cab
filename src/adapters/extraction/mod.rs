//! Deterministic extraction tiers: embedded state and DOM heuristics.

pub mod deep_resolver;
pub mod dom;
pub mod state_locator;
pub mod structured;

use tracing::debug;

use crate::config::types::ExtractionConfig;
use crate::domain::document::RawDocument;
use crate::domain::field::CandidateSet;

/// Structured-tier candidates, or an empty set when the page carries no usable state.
pub fn structured_candidates(doc: &RawDocument, config: &ExtractionConfig) -> CandidateSet {
    match state_locator::locate(doc, config) {
        Some(state) => structured::extract(&state),
        None => {
            debug!(url = %doc.final_url, "No embedded state found");
            CandidateSet::new()
        }
    }
}

pub fn dom_candidates(doc: &RawDocument, config: &ExtractionConfig) -> CandidateSet {
    dom::extract(doc, config)
}
