//! Orchestration of tiers and span allocation.

use citalex_core::{CitationMatch, Context, cache_key};
use tracing::debug;

use crate::allocator::SpanAllocator;
use crate::scrub::scrub_markup;
use crate::tier::Tier;

/// Runs a list of tiers over text and keeps the first claimant of every span.
#[derive(Debug, Clone)]
pub struct CitationExtractor {
    tiers: Vec<Tier>,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationExtractor {
    /// Extractor running every tier in [`Tier::ALL`] order.
    pub fn new() -> Self {
        Self::with_tiers(Tier::ALL)
    }

    /// Extractor running only `tiers`, in the order given.
    pub fn with_tiers(tiers: impl IntoIterator<Item = Tier>) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Find citations in `text`.
    ///
    /// Markup is blanked out before scanning, so offsets in the result are
    /// byte offsets into `text` itself. The result is sorted by `start` and
    /// no two matches overlap.
    pub fn extract(&self, text: &str, context: Option<&Context>) -> Vec<CitationMatch> {
        let scrubbed = scrub_markup(text);
        let mut allocator = SpanAllocator::new();
        let mut matches = Vec::new();

        for &tier in &self.tiers {
            if tier.needs_context() && context.is_none() {
                continue;
            }
            let candidates = tier.scan(&scrubbed, context);
            let found = candidates.len();
            let mut accepted = 0usize;
            for candidate in candidates {
                if !allocator.accept(candidate.start, candidate.end) {
                    continue;
                }
                accepted += 1;
                matches.push(CitationMatch {
                    text: text[candidate.start..candidate.end].to_string(),
                    start: candidate.start,
                    end: candidate.end,
                    cache_key: cache_key(&candidate.parsed),
                    parsed: candidate.parsed,
                });
            }
            debug!(tier = tier.name(), found, accepted, "tier scanned");
        }

        matches.sort_by_key(|m| m.start);
        matches
    }
}

/// Find citations in `text` with the default tier order.
pub fn extract(text: &str, context: Option<&Context>) -> Vec<CitationMatch> {
    CitationExtractor::new().extract(text, context)
}
