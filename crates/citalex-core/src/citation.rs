//! Citation types shared by the extractor, annotator and preview controller.

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_act_type, normalize_year};

/// A citation reduced to the fields needed to look up a single article.
///
/// Equality is structural: two citations found by different tiers compare
/// equal when every field matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCitation {
    /// Canonical act type, e.g. "codice civile" or "legge".
    pub act_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_number: Option<String>,
    /// Four-digit year of the act.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub article: String,
    /// Heuristic score in `0.0..=1.0`, fixed per pattern tier.
    pub confidence: f32,
}

impl ParsedCitation {
    /// Build a citation that inherits the act identity of `context`.
    pub fn from_context(context: &Context, article: impl Into<String>, confidence: f32) -> Self {
        Self {
            act_type: context.act_type.clone(),
            act_number: context.act_number.clone(),
            date: context.date.clone(),
            article: article.into(),
            confidence,
        }
    }
}

/// A citation found in source text.
///
/// `start..end` is a half-open UTF-8 byte range into the original text and
/// always falls on char boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub parsed: ParsedCitation,
    pub cache_key: String,
}

/// Identity of the act currently being read.
///
/// Used to resolve bare references such as "art. 5" that carry no act type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub act_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Context {
    /// Create a context, normalising the act type and year.
    pub fn new(act_type: &str, act_number: Option<&str>, date: Option<&str>) -> Self {
        Self {
            act_type: normalize_act_type(act_type),
            act_number: act_number
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            date: date
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(normalize_year),
        }
    }
}

/// What the article-fetch capability is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub act_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub article: String,
}

impl From<&ParsedCitation> for ArticleRequest {
    fn from(parsed: &ParsedCitation) -> Self {
        Self {
            act_type: parsed.act_type.clone(),
            act_number: parsed.act_number.clone(),
            date: parsed.date.clone(),
            article: parsed.article.clone(),
        }
    }
}

/// Article text returned by the fetch capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Article heading ("rubrica"), when the source provides one.
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    /// Canonical location of the article, if known.
    #[serde(default)]
    pub url: Option<String>,
}
