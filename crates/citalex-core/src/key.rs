//! Deterministic cache identity for parsed citations.

use crate::citation::ParsedCitation;

const SEPARATOR: &str = ":";

/// Build the cache key for a citation.
///
/// Format: `act-type:article[:act_number][:date]`, e.g. "codice-civile:2043"
/// or "legge:3:241:1990". Confidence does not participate, so the same
/// article found by different tiers shares one cache entry.
pub fn cache_key(parsed: &ParsedCitation) -> String {
    let mut parts = vec![parsed.act_type.replace(' ', "-"), parsed.article.clone()];
    if let Some(number) = &parsed.act_number {
        parts.push(number.clone());
    }
    if let Some(date) = &parsed.date {
        parts.push(date.clone());
    }
    parts.join(SEPARATOR)
}
