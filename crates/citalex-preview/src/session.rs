//! Hover-driven preview sessions.
//!
//! ```text
//! Idle ──show──► Debouncing ──timer, cache hit──► Shown
//!                    │
//!                    └──timer, cache miss──► Loading ──ok──► Shown
//!                                               └────err──► Failed
//! any state ──hide / Escape / new target──► Idle
//! ```
//!
//! At most one session is live per controller. Each session runs as a tokio
//! task holding a [`CancellationToken`]; both suspension points (the debounce
//! sleep and the fetch) race against that token. A result is applied only if
//! the published state is still `Loading` for the session's own cache key, so
//! a response that arrives after the user has moved on is dropped.

use std::sync::Arc;

use citalex_core::{ArticleContent, ArticleRequest, ParsedCitation};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{SharedPreviewCache, lock};
use crate::config::PreviewConfig;
use crate::fetch::ArticleFetcher;
use crate::position::{Position, Rect, Size, compute_position};

/// What the renderer should currently display.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Debouncing {
        citation: ParsedCitation,
        cache_key: String,
        target: Rect,
    },
    Loading {
        citation: ParsedCitation,
        cache_key: String,
        target: Rect,
    },
    Shown {
        citation: ParsedCitation,
        cache_key: String,
        data: ArticleContent,
        position: Position,
    },
    Failed {
        citation: ParsedCitation,
        cache_key: String,
        error: String,
    },
}

impl PreviewState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn cache_key(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Debouncing { cache_key, .. }
            | Self::Loading { cache_key, .. }
            | Self::Shown { cache_key, .. }
            | Self::Failed { cache_key, .. } => Some(cache_key),
        }
    }

    pub fn citation(&self) -> Option<&ParsedCitation> {
        match self {
            Self::Idle => None,
            Self::Debouncing { citation, .. }
            | Self::Loading { citation, .. }
            | Self::Shown { citation, .. }
            | Self::Failed { citation, .. } => Some(citation),
        }
    }

    fn is_debouncing_for(&self, key: &str) -> bool {
        matches!(self, Self::Debouncing { cache_key, .. } if cache_key == key)
    }

    fn is_loading_for(&self, key: &str) -> bool {
        matches!(self, Self::Loading { cache_key, .. } if cache_key == key)
    }

    /// Pending or shown for `key`. A failed preview does not count.
    fn is_live_for(&self, key: &str) -> bool {
        match self {
            Self::Debouncing { cache_key, .. }
            | Self::Loading { cache_key, .. }
            | Self::Shown { cache_key, .. } => cache_key == key,
            Self::Idle | Self::Failed { .. } => false,
        }
    }
}

/// Keys the preview reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Host capability for opening a citation in its own view.
pub trait Navigator {
    fn open(&self, citation: &ParsedCitation);
}

struct Session {
    cache_key: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Session {
    fn cancel(self) {
        self.token.cancel();
        self.task.abort();
    }
}

/// Owns the preview state for one preview surface.
///
/// Must be driven from within a tokio runtime: [`show`](Self::show) spawns
/// the session task.
pub struct PreviewController {
    fetcher: Arc<dyn ArticleFetcher>,
    cache: SharedPreviewCache,
    config: PreviewConfig,
    state: Arc<watch::Sender<PreviewState>>,
    session: Option<Session>,
}

impl PreviewController {
    pub fn new(
        fetcher: Arc<dyn ArticleFetcher>,
        cache: SharedPreviewCache,
        config: PreviewConfig,
    ) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            fetcher,
            cache,
            config,
            state: Arc::new(state),
            session: None,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Update the viewport used to place popups of future sessions.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.config.viewport = viewport;
    }

    /// Start a preview for `citation`, shown next to `target`.
    ///
    /// Does nothing if a session for the same `cache_key` is pending or
    /// shown. Otherwise any previous session is cancelled first, so showing
    /// a failed citation again retries the fetch.
    pub fn show(&mut self, target: Rect, citation: ParsedCitation, cache_key: String) {
        if self.session.is_some() && self.state.borrow().is_live_for(&cache_key) {
            debug!(cache_key = %cache_key, "preview already active");
            return;
        }
        self.cancel_session();

        debug!(cache_key = %cache_key, "preview debouncing");
        self.state.send_replace(PreviewState::Debouncing {
            citation: citation.clone(),
            cache_key: cache_key.clone(),
            target,
        });

        let token = CancellationToken::new();
        let task = SessionTask {
            token: token.clone(),
            state: Arc::clone(&self.state),
            cache: Arc::clone(&self.cache),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            target,
            citation,
            cache_key: cache_key.clone(),
        };
        self.session = Some(Session {
            cache_key,
            token,
            task: tokio::spawn(task.run()),
        });
    }

    /// Tear down the current session, whatever state it is in.
    pub fn hide(&mut self) {
        self.cancel_session();
        if !self.state.borrow().is_idle() {
            debug!("preview hidden");
        }
        self.state.send_replace(PreviewState::Idle);
    }

    /// Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape if !self.state.borrow().is_idle() => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    /// Hand the displayed citation to the host and close the preview.
    ///
    /// Only available once the preview has settled (shown or failed).
    pub fn open_in_new_context(&mut self, navigator: &dyn Navigator) -> bool {
        let citation = match &*self.state.borrow() {
            PreviewState::Shown { citation, .. } | PreviewState::Failed { citation, .. } => {
                citation.clone()
            }
            _ => return false,
        };
        self.hide();
        navigator.open(&citation);
        true
    }

    fn cancel_session(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(cache_key = %session.cache_key, "cancelling preview session");
            session.cancel();
        }
    }
}

impl Drop for PreviewController {
    fn drop(&mut self) {
        self.cancel_session();
    }
}

/// Everything one session needs, moved into its task.
struct SessionTask {
    token: CancellationToken,
    state: Arc<watch::Sender<PreviewState>>,
    cache: SharedPreviewCache,
    fetcher: Arc<dyn ArticleFetcher>,
    config: PreviewConfig,
    target: Rect,
    citation: ParsedCitation,
    cache_key: String,
}

impl SessionTask {
    async fn run(self) {
        tokio::select! {
            _ = self.token.cancelled() => return,
            _ = tokio::time::sleep(self.config.debounce) => {}
        }

        let position = compute_position(
            self.target,
            self.config.popup_size,
            self.config.viewport,
            self.config.gap,
            self.config.margin,
        );

        let cached = lock(&self.cache).get(&self.cache_key);
        if let Some(data) = cached {
            debug!(cache_key = %self.cache_key, "preview cache hit");
            self.state.send_if_modified(|state| {
                if !state.is_debouncing_for(&self.cache_key) {
                    return false;
                }
                *state = self.shown(data, position);
                true
            });
            return;
        }

        let entered_loading = self.state.send_if_modified(|state| {
            if !state.is_debouncing_for(&self.cache_key) {
                return false;
            }
            *state = PreviewState::Loading {
                citation: self.citation.clone(),
                cache_key: self.cache_key.clone(),
                target: self.target,
            };
            true
        });
        if !entered_loading {
            return;
        }

        let request = ArticleRequest::from(&self.citation);
        let result = tokio::select! {
            _ = self.token.cancelled() => {
                debug!(cache_key = %self.cache_key, "preview fetch cancelled");
                return;
            }
            result = self.fetcher.fetch(&request) => result,
        };

        // The controller may have moved on while the fetch was in flight.
        if self.token.is_cancelled() || !self.state.borrow().is_loading_for(&self.cache_key) {
            debug!(cache_key = %self.cache_key, "discarding stale preview result");
            return;
        }

        match result {
            Ok(data) => {
                lock(&self.cache).put(self.cache_key.clone(), data.clone());
                self.state.send_if_modified(|state| {
                    if !state.is_loading_for(&self.cache_key) {
                        return false;
                    }
                    *state = self.shown(data, position);
                    true
                });
            }
            Err(e) => {
                warn!(cache_key = %self.cache_key, error = %e, "article fetch failed");
                self.state.send_if_modified(|state| {
                    if !state.is_loading_for(&self.cache_key) {
                        return false;
                    }
                    *state = PreviewState::Failed {
                        citation: self.citation.clone(),
                        cache_key: self.cache_key.clone(),
                        error: e.to_string(),
                    };
                    true
                });
            }
        }
    }

    fn shown(&self, data: ArticleContent, position: Position) -> PreviewState {
        PreviewState::Shown {
            citation: self.citation.clone(),
            cache_key: self.cache_key.clone(),
            data,
            position,
        }
    }
}
