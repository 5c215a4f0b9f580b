//! Markup removal that preserves byte offsets.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag pattern is valid"));

/// Replace every tag-like `<...>` run with the same number of ASCII spaces.
///
/// Byte offsets into the result are valid offsets into `text`, and every
/// non-markup byte is unchanged. Unbalanced `<` or `>` are left alone.
pub fn scrub_markup(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, |caps: &regex::Captures| " ".repeat(caps[0].len()))
}
