//! One-shot preview pipeline: drive a `PreviewController` for a single match
//! against the HTTP article endpoint and wait for it to settle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use citalex_core::{ArticleContent, CitationMatch};
use citalex_preview::{
    HttpArticleFetcher, Position, PreviewCache, PreviewConfig, PreviewController, PreviewState,
    Rect,
};
use serde::Serialize;
use tracing::info;

/// How a preview run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PreviewOutcome {
    Shown {
        citation: CitationMatch,
        content: ArticleContent,
        position: Position,
    },
    Failed {
        citation: CitationMatch,
        error: String,
    },
    TimedOut {
        citation: CitationMatch,
        waited_ms: u64,
    },
}

impl PreviewOutcome {
    pub fn citation(&self) -> &CitationMatch {
        match self {
            Self::Shown { citation, .. }
            | Self::Failed { citation, .. }
            | Self::TimedOut { citation, .. } => citation,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Shown { .. })
    }
}

/// Resolve `target` through a fresh controller and report where it settled.
pub async fn run_preview(
    target: &CitationMatch,
    base_url: &str,
    config: PreviewConfig,
    timeout: Duration,
) -> anyhow::Result<PreviewOutcome> {
    let start = Instant::now();
    let fetcher = Arc::new(HttpArticleFetcher::new(base_url.to_string()));
    let cache = PreviewCache::from_config(&config).into_shared();
    let anchor = anchor_rect(&config);
    let mut controller = PreviewController::new(fetcher, cache, config);
    let mut rx = controller.subscribe();

    controller.show(anchor, target.parsed.clone(), target.cache_key.clone());

    let settled = tokio::time::timeout(timeout, async {
        rx.wait_for(is_settled).await.map(|state| state.clone())
    })
    .await;

    let outcome = match settled {
        Ok(Ok(state)) => match outcome_from_state(target, state) {
            Some(outcome) => outcome,
            None => bail!("preview for {} ended without a result", target.cache_key),
        },
        Ok(Err(_)) => bail!("preview controller closed before settling"),
        Err(_) => {
            controller.hide();
            PreviewOutcome::TimedOut {
                citation: target.clone(),
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        }
    };

    info!(
        cache_key = %target.cache_key,
        failed = outcome.is_failure(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "preview settled"
    );
    Ok(outcome)
}

fn is_settled(state: &PreviewState) -> bool {
    matches!(
        state,
        PreviewState::Shown { .. } | PreviewState::Failed { .. }
    )
}

/// Terminal output has no layout, so the popup is anchored to a one-line
/// target at the top-left of the configured viewport.
fn anchor_rect(config: &PreviewConfig) -> Rect {
    Rect::new(config.margin, config.margin, config.popup_size.width, 16.0)
}

fn outcome_from_state(target: &CitationMatch, state: PreviewState) -> Option<PreviewOutcome> {
    match state {
        PreviewState::Shown { data, position, .. } => Some(PreviewOutcome::Shown {
            citation: target.clone(),
            content: data,
            position,
        }),
        PreviewState::Failed { error, .. } => Some(PreviewOutcome::Failed {
            citation: target.clone(),
            error,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use citalex_extract::extract;
    use citalex_preview::Placement;

    use super::*;

    fn first_match(text: &str) -> CitationMatch {
        extract(text, None).remove(0)
    }

    #[test]
    fn only_terminal_states_settle() {
        assert!(!is_settled(&PreviewState::Idle));
        let m = first_match("ai sensi dell'art. 2043 c.c.");
        assert!(is_settled(&PreviewState::Failed {
            citation: m.parsed.clone(),
            cache_key: m.cache_key.clone(),
            error: "boom".into(),
        }));
        assert!(!is_settled(&PreviewState::Loading {
            citation: m.parsed,
            cache_key: m.cache_key,
            target: Rect::default(),
        }));
    }

    #[test]
    fn shown_state_becomes_outcome() {
        let m = first_match("ai sensi dell'art. 2043 c.c.");
        let content = ArticleContent {
            title: None,
            text: "Qualunque fatto doloso o colposo...".into(),
            url: None,
        };
        let position = Position {
            left: 8.0,
            top: 32.0,
            placement: Placement::Below,
        };
        let state = PreviewState::Shown {
            citation: m.parsed.clone(),
            cache_key: m.cache_key.clone(),
            data: content.clone(),
            position,
        };

        let outcome = outcome_from_state(&m, state).unwrap();
        assert!(!outcome.is_failure());
        assert_eq!(outcome.citation(), &m);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "shown");
        assert_eq!(json["content"]["text"], content.text);
    }

    #[test]
    fn idle_state_has_no_outcome() {
        let m = first_match("art. 1 c.p.");
        assert!(outcome_from_state(&m, PreviewState::Idle).is_none());
    }

    #[test]
    fn timed_out_is_a_failure() {
        let m = first_match("art. 1 c.p.");
        let outcome = PreviewOutcome::TimedOut {
            citation: m,
            waited_ms: 30_000,
        };
        assert!(outcome.is_failure());
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "timed_out");
    }
}
