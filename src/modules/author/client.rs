//! Client for the external page-summary API used for author biographies.

use std::time::Duration;

use async_trait::async_trait;
use lectern_kernel::settings::AuthorSummarySettings;
use reqwest::{header, ClientBuilder, Url};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthorSummaryError {
    #[error("invalid summary service url '{0}'")]
    InvalidBaseUrl(String),

    #[error("failed to build summary http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("summary service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("summary service returned status {0}")]
    UnexpectedStatus(u16),

    #[error("summary service returned an invalid body: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}

/// Source of short author biographies.
#[async_trait]
pub trait AuthorSummaryClient: Send + Sync {
    async fn fetch_summary(&self, author_name: &str) -> Result<String, AuthorSummaryError>;
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    #[serde(default)]
    extract: String,
}

/// [`AuthorSummaryClient`] backed by a REST summary endpoint such as
/// `https://en.wikipedia.org/api/rest_v1/page/summary/{title}`.
pub struct RestSummaryClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl RestSummaryClient {
    pub fn new(settings: &AuthorSummarySettings) -> Result<Self, AuthorSummaryError> {
        let base_url = Url::parse(&settings.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AuthorSummaryError::InvalidBaseUrl(settings.base_url.clone()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ClientBuilder::new()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(Duration::from_millis(settings.timeout_ms))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(AuthorSummaryError::Client)?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// URL of the summary page for `author_name`, encoded as one path segment.
    pub fn summary_url(&self, author_name: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(author_name);
        }
        url
    }
}

#[async_trait]
impl AuthorSummaryClient for RestSummaryClient {
    async fn fetch_summary(&self, author_name: &str) -> Result<String, AuthorSummaryError> {
        let url = self.summary_url(author_name);

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(AuthorSummaryError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "summary service rejected request");
            return Err(AuthorSummaryError::UnexpectedStatus(status.as_u16()));
        }

        let payload: SummaryPayload = response
            .json()
            .await
            .map_err(AuthorSummaryError::InvalidResponse)?;

        tracing::debug!(%url, chars = payload.extract.len(), "author summary fetched");
        Ok(payload.extract)
    }
}
