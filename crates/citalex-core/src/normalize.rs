//! Normalisation of the loose tokens that appear in Italian legal citations.
//!
//! # Conventions
//!
//! - Act types are cited by abbreviation ("c.c.", "d.lgs.", "l.") or in full
//!   ("codice civile", "decreto legislativo"), with inconsistent spacing and
//!   capitalisation ("D. Lgs.", "d.lgs").
//! - Years are written with four digits or, in older texts, two ("l. 241/90").
//! - Article numbers may carry a Latin multiplier for inserted articles
//!   ("2043-bis", "1 ter").

use std::collections::HashMap;
use std::sync::LazyLock;

/// Abbreviation (lowercase, single-spaced) → canonical act type.
const ACT_TYPES: &[(&str, &str)] = &[
    ("c.c.", "codice civile"),
    ("cod. civ.", "codice civile"),
    ("codice civile", "codice civile"),
    ("c.p.", "codice penale"),
    ("cod. pen.", "codice penale"),
    ("codice penale", "codice penale"),
    ("c.p.c.", "codice di procedura civile"),
    ("cod. proc. civ.", "codice di procedura civile"),
    ("codice di procedura civile", "codice di procedura civile"),
    ("c.p.p.", "codice di procedura penale"),
    ("cod. proc. pen.", "codice di procedura penale"),
    ("codice di procedura penale", "codice di procedura penale"),
    ("c.p.a.", "codice del processo amministrativo"),
    ("codice del processo amministrativo", "codice del processo amministrativo"),
    ("c.d.s.", "codice della strada"),
    ("codice della strada", "codice della strada"),
    ("cost.", "costituzione"),
    ("costituzione", "costituzione"),
    ("l.", "legge"),
    ("legge", "legge"),
    ("d.lgs.", "decreto legislativo"),
    ("d.leg.", "decreto legislativo"),
    ("decreto legislativo", "decreto legislativo"),
    ("d.l.", "decreto legge"),
    ("decreto-legge", "decreto legge"),
    ("decreto legge", "decreto legge"),
    ("d.p.r.", "decreto del presidente della repubblica"),
    ("decreto del presidente della repubblica", "decreto del presidente della repubblica"),
    ("d.p.c.m.", "decreto del presidente del consiglio dei ministri"),
    ("d.m.", "decreto ministeriale"),
    ("decreto ministeriale", "decreto ministeriale"),
    ("r.d.", "regio decreto"),
    ("regio decreto", "regio decreto"),
];

static EXACT: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| ACT_TYPES.iter().copied().collect());

static STRIPPED: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    ACT_TYPES
        .iter()
        .map(|&(abbr, canonical)| (strip_whitespace(abbr), canonical))
        .collect()
});

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map an act-type token to its canonical lowercase name.
///
/// Input: "D.Lgs.", "c.c", "Cod. civ.", "Legge"
/// Output: "decreto legislativo", "codice civile", "codice civile", "legge"
///
/// # Algorithm
///
/// 1. Lowercase and collapse runs of whitespace to a single space
/// 2. Exact lookup in the abbreviation table (retrying with a trailing dot)
/// 3. Strip all whitespace and retry against whitespace-stripped keys
/// 4. Unknown tokens are returned as normalised in step 1
pub fn normalize_act_type(raw: &str) -> String {
    let collapsed = collapse_whitespace(&raw.to_lowercase());

    if let Some(canonical) = lookup(&collapsed, |k| EXACT.get(k).copied()) {
        return canonical.to_string();
    }

    let stripped = strip_whitespace(&collapsed);
    if let Some(canonical) = lookup(&stripped, |k| STRIPPED.get(k).copied()) {
        return canonical.to_string();
    }

    collapsed
}

fn lookup(key: &str, table: impl Fn(&str) -> Option<&'static str>) -> Option<&'static str> {
    table(key).or_else(|| {
        // "c.c" and "d.lgs" are common enough to tolerate.
        if key.ends_with('.') || key.is_empty() {
            None
        } else {
            table(&format!("{key}."))
        }
    })
}

/// Expand a two-digit year: above 50 is 19xx, otherwise 20xx.
///
/// "90" → "1990", "16" → "2016", "1942" → "1942". Anything that is not
/// exactly two digits passes through unchanged.
pub fn normalize_year(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() != 2 {
        return raw.to_string();
    }
    match raw.parse::<u32>() {
        Ok(year) if year > 50 => format!("19{raw}"),
        Ok(_) => format!("20{raw}"),
        Err(_) => raw.to_string(),
    }
}

/// Normalise an article number: "2043 Bis" → "2043-bis", " 5 " → "5".
pub fn normalize_article(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
