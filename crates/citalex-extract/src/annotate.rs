//! Inline citation markers for the renderer.
//!
//! Each match is wrapped in a `<span class="citation-ref">` whose
//! `data-citation` attribute holds a JSON [`MarkerPayload`]. The renderer's
//! hover and click handlers read the attribute back with
//! [`MarkerPayload::decode`].

use citalex_core::{CitationMatch, ParsedCitation};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MARKER_CLASS: &str = "citation-ref";
pub const PAYLOAD_ATTR: &str = "data-citation";

/// Data attached to every annotated span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPayload {
    pub parsed: ParsedCitation,
    pub cache_key: String,
}

impl MarkerPayload {
    pub fn from_match(m: &CitationMatch) -> Self {
        Self {
            parsed: m.parsed.clone(),
            cache_key: m.cache_key.clone(),
        }
    }

    /// Serialise to a string safe to place inside a double-quoted attribute.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self).map(|json| escape_attr(&json))
    }

    /// Parse an attribute value back into a payload.
    ///
    /// Accepts both the escaped form written by [`annotate`] and the raw JSON a
    /// DOM attribute getter returns. Anything malformed is `None`: the caller
    /// treats it as "no citation here".
    pub fn decode(attr: &str) -> Option<Self> {
        let payload: Self = serde_json::from_str(&unescape_attr(attr)).ok()?;
        let confidence = payload.parsed.confidence;
        if payload.cache_key.is_empty()
            || payload.parsed.article.is_empty()
            || !(0.0..=1.0).contains(&confidence)
        {
            return None;
        }
        Some(payload)
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_attr(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Wrap every match in `text` with a citation marker.
///
/// Matches are applied from the last `start` to the first so earlier offsets
/// stay valid while the string grows. Bytes outside matched spans are copied
/// unchanged. Matches that fall outside `text`, split a character, or overlap
/// a match already applied are skipped.
pub fn annotate(text: &str, matches: &[CitationMatch]) -> String {
    if matches.is_empty() {
        return text.to_string();
    }

    let mut ordered: Vec<&CitationMatch> = matches.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = text.to_string();
    // Lowest start applied so far; later (earlier-in-text) matches must end before it.
    let mut floor = text.len();

    for m in ordered {
        if m.start >= m.end
            || m.end > floor
            || !text.is_char_boundary(m.start)
            || !text.is_char_boundary(m.end)
        {
            warn!(start = m.start, end = m.end, "skipping unusable citation span");
            continue;
        }
        let payload = match MarkerPayload::from_match(m).encode() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, cache_key = %m.cache_key, "skipping unencodable citation");
                continue;
            }
        };
        let open = format!(r#"<span class="{MARKER_CLASS}" {PAYLOAD_ATTR}="{payload}">"#);
        out.insert_str(m.end, "</span>");
        out.insert_str(m.start, &open);
        floor = m.start;
    }

    out
}
