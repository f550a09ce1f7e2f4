//! Page types produced by fetchers and the crawler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Output of a single page fetch, before the crawler assigns depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    pub title: Option<String>,

    /// Normalized plain text, already truncated
    pub content: String,

    /// Absolute outbound links found in the raw document
    pub links: Vec<String>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this page has content worth keeping.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// A page visited during one crawl session.
///
/// Never mutated after creation; a later visit to the same URL is discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrawledPage {
    /// Normalized URL the page was requested under
    pub url: String,

    pub title: String,

    pub content: String,

    #[serde(default)]
    pub links: Vec<String>,

    /// Hops from a search seed (seeds are depth 0)
    pub depth: usize,

    /// Display label for the originating site
    pub source: String,

    pub timestamp: DateTime<Utc>,
}

impl CrawledPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: content.into(),
            links: Vec::new(),
            depth: 0,
            source: String::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Content length in characters.
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// Canonical form used for visited/queued bookkeeping.
///
/// Drops the fragment and a trailing slash on non-root paths; the URL
/// parser already lower-cases scheme and host. Query strings are kept
/// because reference sites route on them.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    Some(url.to_string())
}
