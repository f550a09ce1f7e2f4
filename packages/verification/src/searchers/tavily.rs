//! Tavily-backed search adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SearchError, SearchResult};
use crate::security::ApiKey;
use crate::traits::searcher::{augment_query, SearchHit, WebSearcher, MAX_SEARCH_RESULTS};

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct Request {
    query: String,
    search_depth: &'static str,
    max_results: usize,
}

#[derive(Deserialize)]
struct Response {
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
}

/// Web search through Tavily's search API.
pub struct TavilySearcher {
    api_key: ApiKey,
    client: reqwest::Client,
    api_url: String,
    max_results: usize,
}

impl TavilySearcher {
    pub fn new(api_key: impl Into<String>) -> SearchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        Ok(Self {
            api_key: ApiKey::new(api_key),
            client,
            api_url: TAVILY_API_URL.to_string(),
            max_results: MAX_SEARCH_RESULTS,
        })
    }

    /// Lower the number of hits requested (never above the global cap).
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.min(MAX_SEARCH_RESULTS);
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl WebSearcher for TavilySearcher {
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        let request = Request {
            query: augment_query(query),
            search_depth: "basic",
            max_results: self.max_results,
        };
        debug!(query = %request.query, "Tavily search");

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", self.api_key.bearer())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Response = response.json().await?;
        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter(|r| url::Url::parse(&r.url).is_ok())
            .take(self.max_results)
            .map(|r| {
                SearchHit::new(r.url)
                    .with_title(r.title.unwrap_or_default())
                    .with_snippet(r.content.unwrap_or_default())
            })
            .collect();

        info!(query = %query, hits = hits.len(), "Search completed");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_results_capped() {
        let searcher = TavilySearcher::new("tvly-test").unwrap().with_max_results(50);
        assert_eq!(searcher.max_results, MAX_SEARCH_RESULTS);
        let searcher = searcher.with_max_results(3);
        assert_eq!(searcher.max_results, 3);
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let body = r#"{"results":[{"url":"https://sunnah.com/bukhari:1","title":"Revelation"},{"url":"https://islamqa.info/en/1","content":"Praise be to Allah"}]}"#;
        let parsed: Response = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert!(parsed.results[0].content.is_none());
        assert!(parsed.results[1].title.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let searcher = TavilySearcher::new("tvly-test")
            .unwrap()
            .with_api_url("http://trusted-sources.invalid/search");
        assert!(searcher.search("patience").await.is_err());
    }
}
