//! Plain HTTP page fetcher.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::fetchers::html;
use crate::security::UrlValidator;
use crate::traits::fetcher::PageFetcher;
use crate::types::config::FetcherConfig;
use crate::types::page::FetchedPage;

/// Fetches a page over HTTP and reduces it to plain text.
///
/// No JavaScript is executed. For hosts that need rendering, route them to
/// a rendering fetcher with `SelectiveFetcher`.
pub struct HttpFetcher {
    client: reqwest::Client,
    validator: UrlValidator,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> FetchResult<Self> {
        Self::with_validator(config, UrlValidator::new())
    }

    /// Build with a custom validator. Redirect hops are checked against it too.
    pub fn with_validator(config: FetcherConfig, validator: UrlValidator) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(validator.redirect_policy())
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            validator,
            config,
        })
    }

    /// Set a custom HTTP client (its own timeout applies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch and normalize, surfacing the failure reason.
    pub async fn try_fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        self.validator.check(&parsed)?;

        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Links resolve against the final URL after redirects
        let final_url = response.url().clone();
        self.validator.check(&final_url)?;
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let mut page = FetchedPage::new(
            final_url.to_string(),
            html::html_to_text(&body, self.config.max_content_chars),
        )
        .with_links(html::extract_links(&final_url, &body));
        page.title = html::extract_title(&body);

        debug!(
            url = %url,
            content_length = page.content.len(),
            links = page.links.len(),
            "Page fetched"
        );
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        match self.try_fetch(url).await {
            Ok(page) if page.has_content() => Some(page),
            Ok(_) => {
                debug!(url = %url, "Page has no text content");
                None
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch page");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocked_url_is_skipped_without_request() {
        let fetcher = HttpFetcher::new(FetcherConfig::default()).unwrap();
        assert!(matches!(
            fetcher.try_fetch("http://169.254.169.254/latest/meta-data").await,
            Err(FetchError::Blocked(_))
        ));
        assert!(fetcher.fetch("http://localhost/admin").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_is_skipped() {
        let fetcher = HttpFetcher::new(FetcherConfig::default()).unwrap();
        assert!(matches!(
            fetcher.try_fetch("not a url").await,
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(fetcher.fetch("not a url").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_skipped() {
        let config = FetcherConfig::default().with_timeout(std::time::Duration::from_millis(200));
        let fetcher = HttpFetcher::new(config).unwrap();
        // .invalid never resolves
        assert!(fetcher.fetch("https://trusted-sources.invalid/").await.is_none());
    }
}
