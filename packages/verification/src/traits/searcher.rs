//! Search adapter trait.
//!
//! One call per crawl session. Adapters append a topical hint to bias the
//! engine toward the reference corpus; filtering to trusted domains is the
//! caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;
use crate::registry::host_of;

/// Maximum hits any adapter returns for one query.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Hint appended to every outgoing query.
pub const TOPICAL_HINT: &str = "islamic quran hadith";

/// A raw search engine hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Host of `link`, lower-cased
    pub domain: String,
}

impl SearchHit {
    pub fn new(link: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            domain: host_of(&link).unwrap_or_default(),
            title: String::new(),
            snippet: String::new(),
            link,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

/// Query as actually sent to the engine.
pub fn augment_query(query: &str) -> String {
    format!("{} {}", query.trim(), TOPICAL_HINT)
}

/// Web search over the open web, biased toward the reference corpus.
///
/// Failures propagate; a crawl cannot start without seeds.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search for `query` (un-augmented). Returns at most
    /// [`MAX_SEARCH_RESULTS`] hits.
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>>;

    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<S: WebSearcher + ?Sized> WebSearcher for std::sync::Arc<S> {
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        (**self).search(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augment_query_always_appends_hint() {
        assert_eq!(augment_query("patience "), "patience islamic quran hadith");
        assert_eq!(
            augment_query("quran on patience"),
            "quran on patience islamic quran hadith"
        );
    }

    #[test]
    fn test_hit_derives_domain() {
        let hit = SearchHit::new("https://WWW.IslamQA.info/en/answers/1")
            .with_title("Answer")
            .with_snippet("...");
        assert_eq!(hit.domain, "www.islamqa.info");
        assert_eq!(hit.title, "Answer");
    }
}
