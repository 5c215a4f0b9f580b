//! The article-fetch capability the preview controller depends on.

use async_trait::async_trait;
use citalex_core::{ArticleContent, ArticleRequest};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "http")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("article not found: {0}")]
    NotFound(String),
}

/// Resolves a citation to the text of the cited article.
///
/// Implementations need not watch for cancellation themselves: the preview
/// controller drops the returned future when a session is abandoned.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, request: &ArticleRequest) -> Result<ArticleContent, FetchError>;
}
