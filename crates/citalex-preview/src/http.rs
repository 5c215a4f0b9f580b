//! HTTP client for the article-resolution endpoint.

use async_trait::async_trait;
use citalex_core::{ArticleContent, ArticleRequest};
use reqwest::StatusCode;
use tracing::info;

use crate::fetch::{ArticleFetcher, FetchError};

/// Fetches article text from `{base_url}/api/articles`.
pub struct HttpArticleFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArticleFetcher {
    /// Create a fetcher for the given endpoint base URL.
    ///
    /// `base_url` should be like `http://localhost:4000` (a trailing slash is trimmed).
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn articles_url(&self) -> String {
        format!("{}/api/articles", self.base_url)
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    /// `GET /api/articles?act_type=..&article=..[&act_number=..][&date=..]`
    async fn fetch(&self, request: &ArticleRequest) -> Result<ArticleContent, FetchError> {
        let url = self.articles_url();

        info!(
            url = %url,
            act_type = %request.act_type,
            article = %request.article,
            "fetching article"
        );
        let resp = self.client.get(&url).query(request).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(format!(
                "art. {} {}",
                request.article, request.act_type
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let content: ArticleContent = serde_json::from_str(&body)?;
        info!(bytes = content.text.len(), "article fetched");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_trims_trailing_slash() {
        let fetcher = HttpArticleFetcher::new("http://localhost:4000/".into());
        assert_eq!(fetcher.base_url, "http://localhost:4000");
        assert_eq!(fetcher.articles_url(), "http://localhost:4000/api/articles");
    }

    #[test]
    fn article_payload_from_endpoint() {
        let json = r#"{
            "title": "Risarcimento per fatto illecito",
            "text": "Qualunque fatto doloso o colposo, che cagiona ad altri un danno ingiusto...",
            "url": null
        }"#;
        let content: ArticleContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.title.as_deref(), Some("Risarcimento per fatto illecito"));
        assert!(content.url.is_none());
    }

    #[test]
    fn server_error_message() {
        let err = FetchError::Server {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "server returned 502: bad gateway");
    }
}
