//! Citation pattern tiers.
//!
//! Each tier is an independent scanner over the whole text. Tiers run in the
//! order of [`Tier::ALL`]; an earlier tier claims its spans before a later
//! tier sees the text, so the order decides which reading of an ambiguous
//! passage wins.
//!
//! | tier | example | confidence |
//! |---|---|---|
//! | [`Tier::FullCitation`] | "legge 241/1990, art. 3" | 0.95 |
//! | [`Tier::MultiArticleWithAct`] | "artt. 1 e 2 c.c." | 0.85 |
//! | [`Tier::ArticleWithAct`] | "art. 2043, comma 1, c.c." | 0.90 |
//! | [`Tier::MultiArticleFromContext`] | "articoli 8 e 9" | 0.75 |
//! | [`Tier::ArticleFromContext`] | "art. 5" | 0.70 |

use std::sync::LazyLock;

use citalex_core::{
    Context, ParsedCitation, normalize_act_type, normalize_article, normalize_year,
};
use regex::Regex;

// ── Pattern fragments ──

const MULTIPLIER: &str = "bis|ter|quater|quinquies|sexies|septies|octies|novies|nonies|decies";

/// Acts cited without number or year: the codes and the constitution.
const CODE_ACT: &str = r"c\.\s?p\.\s?c\.|c\.\s?p\.\s?p\.|c\.\s?p\.\s?a\.|c\.\s?d\.\s?s\.|c\.\s?c\.?|c\.\s?p\.?|cod\.\s?proc\.\s?civ\.|cod\.\s?proc\.\s?pen\.|cod\.\s?civ\.|cod\.\s?pen\.|cost\.|costituzione|codice\s+civile|codice\s+penale|codice\s+di\s+procedura\s+civile|codice\s+di\s+procedura\s+penale|codice\s+del\s+processo\s+amministrativo|codice\s+della\s+strada";

/// Acts identified by number and year.
const NUMBERED_ACT: &str = r"decreto[\s-]+legislativo|decreto[\s-]+legge|decreto\s+del\s+presidente\s+della\s+repubblica|decreto\s+ministeriale|regio\s+decreto|legge|d\.\s?lgs\.?|d\.\s?leg\.|d\.\s?l\.|d\.\s?p\.\s?r\.|d\.\s?p\.\s?c\.\s?m\.|d\.\s?m\.|r\.\s?d\.|l\.";

const ACT_NUMBER_MARKER: &str = r"n\.|n°|nr\.|num\.|numero";

/// Prepositions that may sit between an article and its act ("art. 5 del c.p.").
const LINK: &str = r"(?:(?:del|della|dello|dal|dalla|dallo)\s+)?";

const SINGLE_KEYWORD: &str = r"art\.|articolo";
const MULTI_KEYWORD: &str = r"artt\.|articoli";

fn article() -> String {
    format!(r"\d+(?:\s*-?\s*(?:{MULTIPLIER})\b)?")
}

fn separator() -> &'static str {
    r"(?:\s*[,;]\s*|\s+(?:e|ed|o)\s+)"
}

/// "comma 2", "lett. b)": recognised but not captured.
fn qualifiers() -> String {
    format!(
        r"(?:\s*,?\s*(?:comma|commi|co\.)\s*\d+(?:\s*-?\s*(?:{MULTIPLIER})\b)?)?(?:\s*,?\s*(?:lett\.|lettera)\s*[a-z]{{1,2}}\)?)?"
    )
}

/// The act after an article: a code, or a numbered act with number and year
/// ("del d.lgs. 165/2001", "della legge n. 241 del 1990").
fn act_suffix() -> String {
    format!(
        r"(?:(?P<act>{CODE_ACT})|(?P<numbered>{NUMBERED_ACT})\s*(?:(?:{ACT_NUMBER_MARKER})\s*)?(?P<number>\d+)\s*(?:/|\s+del\s+)\s*(?P<year>\d{{4}}|\d{{2}})\b)"
    )
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("citation pattern is valid")
}

static FULL_CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(?P<act>{NUMBERED_ACT})\s*(?:(?:{ACT_NUMBER_MARKER})\s*)?(?P<number>\d+)\s*(?:/|\s+del\s+)\s*(?P<year>\d{{4}}|\d{{2}})\b(?:\s*,?\s*(?:{SINGLE_KEYWORD})\s*(?P<article>{art}))?",
        art = article(),
    ))
});

static MULTI_WITH_ACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(?:{MULTI_KEYWORD})\s*(?P<article>{art})(?:{sep}{art})*\s*,?\s*{LINK}\b{act}",
        art = article(),
        sep = separator(),
        act = act_suffix(),
    ))
});

static SINGLE_WITH_ACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(?:{SINGLE_KEYWORD})\s*(?P<article>{art}){qual}\s*,?\s*{LINK}\b{act}",
        art = article(),
        qual = qualifiers(),
        act = act_suffix(),
    ))
});

static MULTI_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(?:{MULTI_KEYWORD})\s*(?P<list>{art}(?:{sep}{art})*)",
        art = article(),
        sep = separator(),
    ))
});

static SINGLE_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(?:{SINGLE_KEYWORD})\s*(?P<article>{art}){qual}",
        art = article(),
        qual = qualifiers(),
    ))
});

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!("(?i){}", article())));

/// Matches when an act type follows immediately; bare tiers must then stand down.
static ACT_FOLLOWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)^\s*,?\s*{LINK}\b(?:{CODE_ACT}|{NUMBERED_ACT})"
    ))
});

// ── Tiers ──

/// A raw match proposed by a tier, not yet checked against claimed spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub parsed: ParsedCitation,
}

/// The citation scanners, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Act type + number + year, with a following article reference.
    FullCitation,
    /// "artt." list followed by a code-style act; only the first article is kept.
    MultiArticleWithAct,
    /// Single article followed by a code-style act.
    ArticleWithAct,
    /// Bare "articoli" list resolved against the reading context, one match per article.
    MultiArticleFromContext,
    /// Bare single article resolved against the reading context.
    ArticleFromContext,
}

impl Tier {
    /// Contract order in which tiers claim spans.
    pub const ALL: [Tier; 5] = [
        Tier::FullCitation,
        Tier::MultiArticleWithAct,
        Tier::ArticleWithAct,
        Tier::MultiArticleFromContext,
        Tier::ArticleFromContext,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FullCitation => "full_citation",
            Self::MultiArticleWithAct => "multi_article_with_act",
            Self::ArticleWithAct => "article_with_act",
            Self::MultiArticleFromContext => "multi_article_from_context",
            Self::ArticleFromContext => "article_from_context",
        }
    }

    pub fn confidence(self) -> f32 {
        match self {
            Self::FullCitation => 0.95,
            Self::MultiArticleWithAct => 0.85,
            Self::ArticleWithAct => 0.90,
            Self::MultiArticleFromContext => 0.75,
            Self::ArticleFromContext => 0.70,
        }
    }

    /// Tiers that resolve bare references and never fire without a context.
    pub fn needs_context(self) -> bool {
        matches!(
            self,
            Self::MultiArticleFromContext | Self::ArticleFromContext
        )
    }

    /// Scan `text` and return candidates in the order they were found.
    pub fn scan(self, text: &str, context: Option<&Context>) -> Vec<Candidate> {
        match (self, context) {
            (Self::FullCitation, _) => self.scan_full(text),
            (Self::MultiArticleWithAct, _) => self.scan_with_act(&MULTI_WITH_ACT_RE, text),
            (Self::ArticleWithAct, _) => self.scan_with_act(&SINGLE_WITH_ACT_RE, text),
            (Self::MultiArticleFromContext, Some(ctx)) => self.scan_multi_bare(text, ctx),
            (Self::ArticleFromContext, Some(ctx)) => self.scan_single_bare(text, ctx),
            (_, None) => Vec::new(),
        }
    }

    fn scan_full(self, text: &str) -> Vec<Candidate> {
        FULL_CITATION_RE
            .captures_iter(text)
            .filter_map(|caps| {
                // An act without an article cannot be previewed.
                let article = caps.name("article")?;
                let whole = caps.get(0)?;
                Some(Candidate {
                    start: whole.start(),
                    end: whole.end(),
                    parsed: ParsedCitation {
                        act_type: normalize_act_type(&caps["act"]),
                        act_number: Some(caps["number"].to_string()),
                        date: Some(normalize_year(&caps["year"])),
                        article: normalize_article(article.as_str()),
                        confidence: self.confidence(),
                    },
                })
            })
            .collect()
    }

    fn scan_with_act(self, re: &Regex, text: &str) -> Vec<Candidate> {
        re.captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let act = caps.name("act").or_else(|| caps.name("numbered"))?;
                Some(Candidate {
                    start: whole.start(),
                    end: whole.end(),
                    parsed: ParsedCitation {
                        act_type: normalize_act_type(act.as_str()),
                        act_number: caps.name("number").map(|m| m.as_str().to_string()),
                        date: caps.name("year").map(|m| normalize_year(m.as_str())),
                        article: normalize_article(&caps["article"]),
                        confidence: self.confidence(),
                    },
                })
            })
            .collect()
    }

    fn scan_multi_bare(self, text: &str, ctx: &Context) -> Vec<Candidate> {
        let mut out = Vec::new();
        for caps in MULTI_BARE_RE.captures_iter(text) {
            let (Some(whole), Some(list)) = (caps.get(0), caps.name("list")) else {
                continue;
            };
            if act_follows(&text[whole.end()..]) {
                continue;
            }
            for (i, m) in ARTICLE_RE.find_iter(list.as_str()).enumerate() {
                // The first article carries the keyword, the rest stand alone.
                let start = if i == 0 {
                    whole.start()
                } else {
                    list.start() + m.start()
                };
                out.push(Candidate {
                    start,
                    end: list.start() + m.end(),
                    parsed: ParsedCitation::from_context(
                        ctx,
                        normalize_article(m.as_str()),
                        self.confidence(),
                    ),
                });
            }
        }
        out
    }

    fn scan_single_bare(self, text: &str, ctx: &Context) -> Vec<Candidate> {
        SINGLE_BARE_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if act_follows(&text[whole.end()..]) {
                    return None;
                }
                Some(Candidate {
                    start: whole.start(),
                    end: whole.end(),
                    parsed: ParsedCitation::from_context(
                        ctx,
                        normalize_article(&caps["article"]),
                        self.confidence(),
                    ),
                })
            })
            .collect()
    }
}

fn act_follows(rest: &str) -> bool {
    ACT_FOLLOWS_RE.is_match(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law_241() -> Context {
        Context::new("legge", Some("241"), Some("1990"))
    }

    fn articles(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.parsed.article.as_str()).collect()
    }

    #[test]
    fn order_is_fixed() {
        assert_eq!(Tier::ALL[0], Tier::FullCitation);
        assert_eq!(Tier::ALL[4], Tier::ArticleFromContext);
        assert!(Tier::ALL.iter().filter(|t| t.needs_context()).count() == 2);
    }

    #[test]
    fn full_citation_with_article() {
        let found = Tier::FullCitation.scan("legge 241/1990 art. 3", None);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!((c.start, c.end), (0, 21));
        assert_eq!(c.parsed.act_type, "legge");
        assert_eq!(c.parsed.act_number.as_deref(), Some("241"));
        assert_eq!(c.parsed.date.as_deref(), Some("1990"));
        assert_eq!(c.parsed.article, "3");
        assert_eq!(c.parsed.confidence, 0.95);
    }

    #[test]
    fn full_citation_variants() {
        let text = "ai sensi del d.lgs. n. 165 del 2001, articolo 5";
        let found = Tier::FullCitation.scan(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.act_type, "decreto legislativo");
        assert_eq!(found[0].parsed.act_number.as_deref(), Some("165"));
        assert_eq!(found[0].parsed.date.as_deref(), Some("2001"));
        assert_eq!(found[0].parsed.article, "5");

        let found = Tier::FullCitation.scan("L. 241/90, art. 21-octies", None);
        assert_eq!(found[0].parsed.date.as_deref(), Some("1990"));
        assert_eq!(found[0].parsed.article, "21-octies");
    }

    #[test]
    fn full_citation_without_article_discarded() {
        assert!(Tier::FullCitation.scan("la legge 241/1990 disciplina", None).is_empty());
    }

    #[test]
    fn multi_with_act_keeps_first_article() {
        let found = Tier::MultiArticleWithAct.scan("artt. 1 e 2 c.c.", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.article, "1");
        assert_eq!(found[0].parsed.act_type, "codice civile");
        assert_eq!(found[0].parsed.confidence, 0.85);
        assert_eq!((found[0].start, found[0].end), (0, 16));
    }

    #[test]
    fn multi_with_act_comma_before_suffix() {
        let found = Tier::MultiArticleWithAct.scan("si vedano gli artt. 1, 2 e 3, c.p.c.", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.act_type, "codice di procedura civile");
    }

    #[test]
    fn single_with_act() {
        let found = Tier::ArticleWithAct.scan("art. 2043 c.c.", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.act_type, "codice civile");
        assert_eq!(found[0].parsed.article, "2043");
        assert_eq!(found[0].parsed.confidence, 0.90);
        assert!(found[0].parsed.act_number.is_none());
    }

    #[test]
    fn single_with_act_ignores_qualifiers() {
        let text = "l'art. 2043, comma 1, lett. a), del c.c. prevede";
        let found = Tier::ArticleWithAct.scan(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.article, "2043");
        assert_eq!(
            &text[found[0].start..found[0].end],
            "art. 2043, comma 1, lett. a), del c.c."
        );
    }

    #[test]
    fn single_with_numbered_act() {
        let text = "art. 5 del d.lgs. 165/2001";
        let found = Tier::ArticleWithAct.scan(text, None);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!((c.start, c.end), (0, text.len()));
        assert_eq!(c.parsed.act_type, "decreto legislativo");
        assert_eq!(c.parsed.act_number.as_deref(), Some("165"));
        assert_eq!(c.parsed.date.as_deref(), Some("2001"));
        assert_eq!(c.parsed.article, "5");
        assert_eq!(c.parsed.confidence, 0.90);

        let found = Tier::ArticleWithAct.scan("art. 21 della legge n. 241 del 90", None);
        assert_eq!(found[0].parsed.act_type, "legge");
        assert_eq!(found[0].parsed.act_number.as_deref(), Some("241"));
        assert_eq!(found[0].parsed.date.as_deref(), Some("1990"));
    }

    #[test]
    fn numbered_act_needs_number_and_year() {
        assert!(Tier::ArticleWithAct.scan("art. 5 della legge", None).is_empty());
        assert!(Tier::ArticleWithAct.scan("art. 5 della legge 241", None).is_empty());
    }

    #[test]
    fn multi_with_numbered_act_keeps_first_article() {
        let found = Tier::MultiArticleWithAct.scan("artt. 1 e 2 della l. 300/1970", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.article, "1");
        assert_eq!(found[0].parsed.act_type, "legge");
        assert_eq!(found[0].parsed.act_number.as_deref(), Some("300"));
        assert_eq!(found[0].parsed.date.as_deref(), Some("1970"));
        assert_eq!(found[0].parsed.confidence, 0.85);
    }

    #[test]
    fn single_with_act_full_code_name() {
        let found = Tier::ArticleWithAct.scan("Articolo 3 della Costituzione", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.act_type, "costituzione");
    }

    #[test]
    fn multi_bare_emits_each_article() {
        let text = "articoli 8 e 9";
        let found = Tier::MultiArticleFromContext.scan(text, Some(&law_241()));
        assert_eq!(articles(&found), vec!["8", "9"]);
        assert_eq!(&text[found[0].start..found[0].end], "articoli 8");
        assert_eq!(&text[found[1].start..found[1].end], "9");
        for c in &found {
            assert_eq!(c.parsed.act_type, "legge");
            assert_eq!(c.parsed.act_number.as_deref(), Some("241"));
            assert_eq!(c.parsed.date.as_deref(), Some("1990"));
            assert_eq!(c.parsed.confidence, 0.75);
        }
    }

    #[test]
    fn multi_bare_with_suffixes() {
        let text = "artt. 3-bis, 4 e 5 ter";
        let found = Tier::MultiArticleFromContext.scan(text, Some(&law_241()));
        assert_eq!(articles(&found), vec!["3-bis", "4", "5-ter"]);
    }

    #[test]
    fn bare_tiers_need_context() {
        assert!(Tier::MultiArticleFromContext.scan("articoli 8 e 9", None).is_empty());
        assert!(Tier::ArticleFromContext.scan("art. 5", None).is_empty());
    }

    #[test]
    fn bare_tiers_stand_down_before_act() {
        let ctx = law_241();
        assert!(Tier::ArticleFromContext.scan("art. 5 c.c.", Some(&ctx)).is_empty());
        assert!(
            Tier::ArticleFromContext
                .scan("art. 5 della legge 300/1970", Some(&ctx))
                .is_empty()
        );
        assert!(Tier::MultiArticleFromContext.scan("artt. 1 e 2, c.p.", Some(&ctx)).is_empty());
    }

    #[test]
    fn single_bare_resolves_context() {
        let text = "come previsto dall'art. 5, comma 2";
        let found = Tier::ArticleFromContext.scan(text, Some(&law_241()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parsed.article, "5");
        assert_eq!(found[0].parsed.confidence, 0.70);
        assert_eq!(found[0].parsed.act_number.as_deref(), Some("241"));
    }

    #[test]
    fn plural_keyword_not_single() {
        assert!(Tier::ArticleFromContext.scan("artt. 1 e 2", Some(&law_241())).is_empty());
    }
}
