//! Terminal rendering for extracted citations and previewed articles.
//!
//! Matches print as an aligned table; a preview prints as a vertical card
//! grouped into sections, with the article text wrapped to a fixed width.

use std::fmt::Write as _;

use citalex_core::{CitationMatch, ParsedCitation};

use crate::preview::PreviewOutcome;

const WRAP_WIDTH: usize = 78;
const MAX_SNIPPET_CHARS: usize = 40;

// ── Public API ──

pub fn print_match_table(matches: &[CitationMatch]) {
    print!("{}", format_match_table(matches));
}

pub fn print_outcome(outcome: &PreviewOutcome) {
    print!("{}", format_outcome(outcome));
}

// ── Match table ──

pub fn format_match_table(matches: &[CitationMatch]) -> String {
    let mut out = String::new();
    if matches.is_empty() {
        out.push_str("(no citations found)\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>3}  {:<11} {:<10} {:<28} {:<8} {:<6} {:>5}  {}",
        "#", "span", "article", "act", "number", "year", "conf", "text"
    );
    for (i, m) in matches.iter().enumerate() {
        let p = &m.parsed;
        let _ = writeln!(
            out,
            "{:>3}  {:<11} {:<10} {:<28} {:<8} {:<6} {:>5.2}  {}",
            i,
            format!("{}..{}", m.start, m.end),
            p.article,
            p.act_type,
            p.act_number.as_deref().unwrap_or("-"),
            p.date.as_deref().unwrap_or("-"),
            p.confidence,
            snippet(&m.text),
        );
    }
    let _ = writeln!(out, "\n{} citation(s)", matches.len());
    out
}

// ── Preview card ──

pub fn format_outcome(outcome: &PreviewOutcome) -> String {
    let citation = outcome.citation();
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ===", heading(&citation.parsed));
    if let PreviewOutcome::Shown { content, .. } = outcome
        && let Some(title) = content.title.as_deref().filter(|t| !t.is_empty())
    {
        let _ = writeln!(out, "{title}");
    }
    out.push('\n');

    out.push_str("Citation\n");
    field(&mut out, "matched text", &citation.text);
    field(&mut out, "act type", &citation.parsed.act_type);
    if let Some(number) = &citation.parsed.act_number {
        field(&mut out, "act number", number);
    }
    if let Some(date) = &citation.parsed.date {
        field(&mut out, "year", date);
    }
    field(&mut out, "article", &citation.parsed.article);
    field(&mut out, "cache key", &citation.cache_key);
    out.push('\n');

    match outcome {
        PreviewOutcome::Shown {
            content, position, ..
        } => {
            out.push_str("Article\n");
            for line in wrap(&content.text, WRAP_WIDTH - 2) {
                let _ = writeln!(out, "  {line}");
            }
            if let Some(url) = &content.url {
                out.push('\n');
                field(&mut out, "source", url);
            }
            field(
                &mut out,
                "popup",
                &format!(
                    "{:?} at ({:.0}, {:.0})",
                    position.placement, position.left, position.top
                ),
            );
        }
        PreviewOutcome::Failed { error, .. } => {
            out.push_str("Error\n");
            field(&mut out, "message", error);
        }
        PreviewOutcome::TimedOut { waited_ms, .. } => {
            out.push_str("Error\n");
            field(&mut out, "message", &format!("no answer after {waited_ms} ms"));
        }
    }
    out
}

fn heading(parsed: &ParsedCitation) -> String {
    let mut s = format!("art. {} {}", parsed.article, parsed.act_type);
    match (&parsed.act_number, &parsed.date) {
        (Some(n), Some(y)) => {
            let _ = write!(s, " {n}/{y}");
        }
        (Some(n), None) => {
            let _ = write!(s, " n. {n}");
        }
        (None, Some(y)) => {
            let _ = write!(s, " ({y})");
        }
        (None, None) => {}
    }
    s
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<14} {value}");
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_SNIPPET_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(MAX_SNIPPET_CHARS - 3).collect();
    format!("{cut}...")
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let current = line.chars().count();
            if current > 0 && current + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use citalex_core::ArticleContent;
    use citalex_extract::extract;
    use citalex_preview::{Placement, Position};

    use super::*;

    #[test]
    fn empty_table() {
        assert_eq!(format_match_table(&[]), "(no citations found)\n");
    }

    #[test]
    fn table_lists_every_match() {
        let matches = extract("Si vedano l'art. 2043 c.c. e la legge 241/1990, art. 3.", None);
        let table = format_match_table(&matches);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("article"));
        assert!(lines[1].contains("codice civile"));
        assert!(lines[1].contains("2043"));
        assert!(lines[2].contains("legge"));
        assert!(lines[2].contains("1990"));
        assert!(table.ends_with("2 citation(s)\n"));
    }

    #[test]
    fn shown_card() {
        let m = extract("art. 2043 c.c.", None).remove(0);
        let outcome = PreviewOutcome::Shown {
            citation: m,
            content: ArticleContent {
                title: Some("Risarcimento per fatto illecito".into()),
                text: "Qualunque fatto doloso o colposo, che cagiona ad altri un danno \
                       ingiusto, obbliga colui che ha commesso il fatto a risarcire il danno."
                    .into(),
                url: None,
            },
            position: Position {
                left: 8.0,
                top: 32.0,
                placement: Placement::Below,
            },
        };
        let card = format_outcome(&outcome);
        assert!(card.starts_with("=== art. 2043 codice civile ===\nRisarcimento"));
        assert!(card.contains("Article\n  Qualunque fatto"));
        assert!(card.contains("Below at (8, 32)"));
        assert!(card.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
    }

    #[test]
    fn failed_card() {
        let m = extract("legge 241/1990 art. 3", None).remove(0);
        let outcome = PreviewOutcome::Failed {
            citation: m,
            error: "server returned 500: boom".into(),
        };
        let card = format_outcome(&outcome);
        assert!(card.starts_with("=== art. 3 legge 241/1990 ==="));
        assert!(card.contains("Error\n  message        server returned 500: boom"));
    }

    #[test]
    fn wrap_breaks_on_width() {
        assert_eq!(wrap("uno due tre", 7), vec!["uno due", "tre"]);
        assert_eq!(wrap("precipitevolissimevolmente x", 5), vec![
            "precipitevolissimevolmente",
            "x"
        ]);
        assert_eq!(wrap("a\nb", 80), vec!["a", "b"]);
    }

    #[test]
    fn snippet_truncates_long_text() {
        let long = "articoli 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14";
        let s = snippet(long);
        assert_eq!(s.chars().count(), MAX_SNIPPET_CHARS);
        assert!(s.ends_with("..."));
        assert_eq!(snippet("art.\n  5"), "art. 5");
    }
}
