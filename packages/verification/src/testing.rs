//! Testing utilities including mock implementations.
//!
//! Deterministic stand-ins for the search engine, page fetcher, hadith API
//! and summarizer, so the crawler and pipelines can be exercised without
//! network access.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{SearchError, SearchResult};
use crate::hadith::{HadithLookup, HadithRecord};
use crate::traits::{
    fetcher::PageFetcher,
    searcher::{SearchHit, WebSearcher},
    summarizer::{Summarizer, SummarizerError},
};
use crate::types::page::FetchedPage;

/// Mock search engine.
///
/// Returns canned hits per query, falling back to a default list.
#[derive(Default, Clone)]
pub struct MockSearcher {
    hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,
    default_hits: Arc<RwLock<Vec<SearchHit>>>,
    fail_with: Arc<RwLock<Option<u16>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for any query without its own entry.
    pub fn with_hits(self, hits: Vec<SearchHit>) -> Self {
        *self.default_hits.write().unwrap() = hits;
        self
    }

    /// Convenience for hits that only carry a link.
    pub fn with_links(self, links: &[&str]) -> Self {
        self.with_hits(links.iter().map(|l| SearchHit::new(*l)).collect())
    }

    pub fn with_query_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Every search fails with an API error carrying `status`.
    pub fn failing(self, status: u16) -> Self {
        *self.fail_with.write().unwrap() = Some(status);
        self
    }

    /// Queries received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        self.calls.write().unwrap().push(query.to_string());

        if let Some(status) = *self.fail_with.read().unwrap() {
            return Err(SearchError::Api {
                status,
                body: "mock search failure".to_string(),
            });
        }

        let hits = self.hits.read().unwrap().get(query).cloned();
        Ok(hits.unwrap_or_else(|| self.default_hits.read().unwrap().clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock page fetcher.
///
/// Clones share pages and call history. Unknown URLs fetch as `None` but
/// are still recorded.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    calls: Arc<RwLock<Vec<String>>>,
    delay: Option<Duration>,
    cancel_on_fetch: Option<CancellationToken>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` at `url`, with no title or links.
    pub fn with_page(self, url: impl Into<String>, content: impl Into<String>) -> Self {
        let url = url.into();
        let page = FetchedPage::new(url.clone(), content);
        self.pages.write().unwrap().insert(url, page);
        self
    }

    /// Serve a fully built page. It is keyed by `page.url` unless `at` is given,
    /// which lets a test simulate a redirect.
    pub fn with_fetched(self, at: Option<&str>, page: FetchedPage) -> Self {
        let key = at.map(str::to_string).unwrap_or_else(|| page.url.clone());
        self.pages.write().unwrap().insert(key, page);
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancel `token` as soon as the first fetch starts.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_fetch = Some(token);
        self
    }

    /// URLs requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pages.read().unwrap().get(url).cloned()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock hadith API keyed by `(collection, number)`.
#[derive(Default, Clone)]
pub struct MockHadithLookup {
    records: Arc<RwLock<HashMap<(String, u32), HadithRecord>>>,
}

impl MockHadithLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: HadithRecord) -> Self {
        self.records
            .write()
            .unwrap()
            .insert((record.collection.clone(), record.number), record);
        self
    }
}

#[async_trait]
impl HadithLookup for MockHadithLookup {
    async fn lookup(&self, collection: &str, number: u32) -> Option<HadithRecord> {
        self.records
            .read()
            .unwrap()
            .get(&(collection.to_string(), number))
            .cloned()
    }
}

/// Mock summarizer that echoes how much evidence it was given.
#[derive(Default, Clone)]
pub struct MockSummarizer {
    answer: Option<String>,
    fail: bool,
    calls: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// `(question, evidence)` pairs received.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, question: &str, evidence: &str) -> Result<String, SummarizerError> {
        self.calls
            .write()
            .unwrap()
            .push((question.to_string(), evidence.to_string()));
        if self.fail {
            return Err("mock summarizer failure".into());
        }
        Ok(self
            .answer
            .clone()
            .unwrap_or_else(|| format!("Answer based on {} characters of evidence.", evidence.len())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Page body long enough to pass content-length filters.
pub fn long_content(topic: &str) -> String {
    format!(
        "{topic}. This page discusses {topic} with references to the Quran and the Sunnah, \
         quoting scholars and explaining the evidence in detail for the reader."
    )
}
