//! HTTP fetcher for the published price page.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::FetchError;

/// Performs a single GET of the source page and returns its body.
///
/// No retries and no caching: one call is one request. Retry policy, if any,
/// belongs to whoever drives the refresh cycle.
pub struct PriceTableFetcher {
    client: Client,
    url: Url,
}

impl PriceTableFetcher {
    /// Creates a fetcher for `source_url` with the given request timeout and
    /// `User-Agent`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `source_url` is not an absolute http(s) URL.
    /// - [`FetchError::Transport`] if the underlying `reqwest::Client` cannot
    ///   be constructed (e.g., invalid TLS config).
    pub fn new(source_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let url = Url::parse(source_url).map_err(|e| FetchError::InvalidUrl {
            url: source_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: source_url.to_owned(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Fetches the page and returns the full HTML document.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UnexpectedStatus`] for any non-2xx response.
    /// - [`FetchError::Transport`] on network failure, timeout, or a body
    ///   that cannot be read.
    pub async fn fetch(&self) -> Result<String, FetchError> {
        tracing::debug!(url = %self.url, "fetching price page");
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url = %self.url, bytes = body.len(), "price page fetched");
        Ok(body)
    }
}
