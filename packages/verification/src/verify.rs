//! Claim verification.
//!
//! Crawls the trusted corpus for a claim and ranks what it finds:
//!
//! 1. Reject queries shorter than three characters.
//! 2. Add a claim-type hint to the search query when it lacks one.
//! 3. Crawl; drop pages with less than 100 characters of text.
//! 4. Score each page against the original claim, snippet it against the query.
//! 5. Stable-sort by tier and keep the first ten.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classify::build_search_query;
use crate::crawler::Crawler;
use crate::error::{Result, VerifyError};
use crate::relevance::{extract_snippet, score};
use crate::traits::{fetcher::PageFetcher, searcher::WebSearcher};
use crate::types::config::{CrawlerConfig, TraversalProfile};
use crate::types::verification::{ClaimType, VerificationResult, VerifyRequest, VerifyResponse};

pub const MIN_QUERY_CHARS: usize = 3;

/// Pages with less text than this carry no usable evidence.
pub const MIN_CONTENT_CHARS: usize = 100;

pub const MAX_RESULTS: usize = 10;

/// Reject queries too short to search for.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(VerifyError::invalid_query(format!(
            "query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Ranks trusted-corpus evidence for a single claim.
pub struct VerificationOrchestrator<S, F> {
    crawler: Crawler<S, F>,
    config: CrawlerConfig,
}

impl<S: WebSearcher, F: PageFetcher> VerificationOrchestrator<S, F> {
    /// Quick, trusted-only sessions.
    pub fn new(crawler: Crawler<S, F>) -> Self {
        Self {
            crawler,
            config: CrawlerConfig::from_profile(TraversalProfile::Quick),
        }
    }

    pub fn with_profile(mut self, profile: TraversalProfile) -> Self {
        let concurrency = self.config.concurrency;
        self.config = CrawlerConfig::from_profile(profile).with_concurrency(concurrency);
        self
    }

    /// Replace the crawl configuration. Sessions stay trusted-only.
    pub fn with_config(mut self, config: CrawlerConfig) -> Self {
        self.config = config.with_trusted_only(true);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn crawler(&self) -> &Crawler<S, F> {
        &self.crawler
    }

    pub async fn verify(
        &self,
        query: &str,
        claim_type: ClaimType,
        original_claim: &str,
    ) -> Result<VerifyResponse> {
        self.verify_with_cancel(query, claim_type, original_claim, &CancellationToken::new())
            .await
    }

    /// Verify a deserialized request.
    pub async fn handle(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        self.verify(&request.query, request.claim_type, &request.original_claim)
            .await
    }

    pub async fn verify_with_cancel(
        &self,
        query: &str,
        claim_type: ClaimType,
        original_claim: &str,
        cancel: &CancellationToken,
    ) -> Result<VerifyResponse> {
        let query = validate_query(query)?;
        let search_query = build_search_query(query, claim_type);
        let claim = match original_claim.trim() {
            "" => query,
            claim => claim,
        };

        info!(
            query = %query,
            search_query = %search_query,
            claim_type = %claim_type,
            "Verifying claim"
        );

        let report = self.crawler.crawl(&search_query, &self.config, cancel).await?;
        if report.cancelled && report.pages.is_empty() {
            return Err(VerifyError::Cancelled);
        }

        let mut results: Vec<VerificationResult> = report
            .pages
            .into_iter()
            .filter(|page| page.content_length() >= MIN_CONTENT_CHARS)
            .map(|page| VerificationResult {
                relevance: score(claim, &page.content, &page.title),
                content: extract_snippet(&page.content, query),
                url: page.url,
                title: page.title,
                source: page.source,
            })
            .collect();

        // stable: equal tiers keep crawl completion order
        results.sort_by_key(|r| r.relevance);
        let total_found = results.len();
        results.truncate(MAX_RESULTS);

        debug!(total_found, returned = results.len(), "Verification ranked");

        Ok(VerifyResponse {
            results,
            query: search_query,
            total_found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{long_content, MockFetcher, MockSearcher};
    use crate::types::page::FetchedPage;
    use crate::types::verification::Relevance;

    fn orchestrator(searcher: MockSearcher, fetcher: MockFetcher) -> VerificationOrchestrator<MockSearcher, MockFetcher> {
        VerificationOrchestrator::new(Crawler::new(searcher, fetcher))
    }

    #[tokio::test]
    async fn test_short_query_is_input_error() {
        let searcher = MockSearcher::new();
        let verifier = orchestrator(searcher.clone(), MockFetcher::new());

        let err = verifier.verify(" ab ", ClaimType::Hadith, "").await.unwrap_err();
        assert!(err.is_input_error());
        assert!(searcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_query_carries_type_hint() {
        let searcher = MockSearcher::new();
        let verifier = orchestrator(searcher.clone(), MockFetcher::new());

        let response = verifier
            .verify("charity extinguishes sins", ClaimType::Hadith, "")
            .await
            .unwrap();
        assert_eq!(response.query, "charity extinguishes sins hadith");
        assert_eq!(searcher.calls(), vec!["charity extinguishes sins hadith".to_string()]);
        assert_eq!(response.total_found, 0);
    }

    #[tokio::test]
    async fn test_thin_pages_are_dropped_and_results_ranked() {
        let searcher = MockSearcher::new().with_links(&[
            "https://islamqa.info/low",
            "https://islamqa.info/thin",
            "https://sunnah.com/high",
        ]);
        let fetcher = MockFetcher::new()
            .with_page("https://islamqa.info/low", long_content("unrelated matters of trade"))
            .with_page("https://islamqa.info/thin", "charity extinguishes sins")
            .with_page(
                "https://sunnah.com/high",
                long_content("charity extinguishes sins as water extinguishes fire"),
            );
        let verifier = orchestrator(searcher, fetcher);

        let response = verifier
            .verify("charity", ClaimType::General, "charity extinguishes sins")
            .await
            .unwrap();

        assert_eq!(response.total_found, 2);
        assert_eq!(response.results[0].url, "https://sunnah.com/high");
        assert_eq!(response.results[0].relevance, Relevance::High);
        assert_eq!(response.results[1].relevance, Relevance::Low);
        assert!(response.results.iter().all(|r| r.url != "https://islamqa.info/thin"));
    }

    #[tokio::test]
    async fn test_results_truncated_to_ten() {
        let links: Vec<String> = (0..12).map(|n| format!("https://sunnah.com/{n}")).collect();
        let mut fetcher = MockFetcher::new();
        for link in &links {
            fetcher = fetcher.with_fetched(None, FetchedPage::new(link.clone(), long_content("patience")));
        }
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let verifier = orchestrator(MockSearcher::new().with_links(&link_refs), fetcher)
            .with_config(CrawlerConfig::default().with_max_seeds(12).with_max_pages(12));

        let response = verifier.verify("patience", ClaimType::Quran, "").await.unwrap();
        assert_eq!(response.total_found, 12);
        assert_eq!(response.results.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let verifier = orchestrator(MockSearcher::new().failing(502), MockFetcher::new());
        let err = verifier.verify("patience", ClaimType::General, "").await.unwrap_err();
        assert!(matches!(err, VerifyError::Search(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_with_config_forces_trusted_only() {
        let verifier = orchestrator(MockSearcher::new(), MockFetcher::new())
            .with_config(CrawlerConfig::default().with_trusted_only(false));
        assert!(verifier.config().trusted_only);
    }
}
