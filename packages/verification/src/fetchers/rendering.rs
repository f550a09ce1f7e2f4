//! Rendering fetcher backed by the Firecrawl scrape API.
//!
//! Used for the few reference sites that build their content client-side.
//! Firecrawl executes the page's JavaScript and returns markdown; the
//! result is normalized exactly like a plain HTTP fetch and obeys the same
//! timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::fetchers::html;
use crate::security::{ApiKey, UrlValidator};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::FetcherConfig;
use crate::types::page::FetchedPage;

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 2],
    only_main_content: bool,
    /// Milliseconds Firecrawl may spend rendering
    timeout: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    #[serde(default)]
    links: Vec<String>,
    metadata: Option<PageMetadata>,
}

#[derive(Deserialize)]
struct PageMetadata {
    title: Option<String>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
}

pub struct RenderingFetcher {
    client: reqwest::Client,
    api_key: ApiKey,
    api_url: String,
    validator: UrlValidator,
    config: FetcherConfig,
}

impl RenderingFetcher {
    pub fn new(api_key: impl Into<String>, config: FetcherConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key: ApiKey::new(api_key),
            api_url: FIRECRAWL_API_URL.to_string(),
            validator: UrlValidator::new(),
            config,
        })
    }

    /// Point at a different API base (self-hosted Firecrawl).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub async fn try_fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.validator.check_str(url)?;

        let request = ScrapeRequest {
            url,
            formats: ["markdown", "links"],
            only_main_content: true,
            timeout: self.config.timeout.as_millis() as u64,
        };

        debug!(url = %url, "Rendered fetch starting");
        let response = self
            .client
            .post(format!("{}/scrape", self.api_url))
            .header("Authorization", self.api_key.bearer())
            .json(&request)
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

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let data = match body {
            ScrapeResponse {
                success: true,
                data: Some(data),
            } => data,
            _ => {
                return Err(FetchError::Http(
                    format!("Firecrawl returned no data for {url}").into(),
                ))
            }
        };

        let (title, final_url) = match data.metadata {
            Some(meta) => (meta.title, meta.source_url),
            None => (None, None),
        };

        let mut page = FetchedPage::new(
            final_url.unwrap_or_else(|| url.to_string()),
            html::normalize_text(
                data.markdown.as_deref().unwrap_or_default(),
                self.config.max_content_chars,
            ),
        )
        .with_links(
            data.links
                .into_iter()
                .filter(|l| l.starts_with("http://") || l.starts_with("https://")),
        );
        page.title = title.filter(|t| !t.trim().is_empty());
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher for RenderingFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        match self.try_fetch(url).await {
            Ok(page) if page.has_content() => Some(page),
            Ok(_) => None,
            Err(e) => {
                warn!(url = %url, error = %e, "Rendered fetch failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}
