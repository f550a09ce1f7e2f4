//! Search-seeded breadth-first crawler.
//!
//! One session per call: a single search seeds the frontier at depth 0,
//! then pages are fetched with bounded concurrency and their links are
//! followed up to the configured depth. Results arrive in completion order.
//!
//! ```text
//! Idle -> Searching -> Expanding -> Done
//!             |
//!             +-> Error (search failed, no seeds)
//! ```
//!
//! The session stops dequeuing when the frontier is empty, the page budget
//! is spent or the caller cancels. Fetches already in flight are drained,
//! never abandoned.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SearchResult;
use crate::registry::{host_of, TrustedDomainRegistry};
use crate::traits::{fetcher::PageFetcher, searcher::WebSearcher};
use crate::types::config::CrawlerConfig;
use crate::types::page::{normalize_url, CrawledPage, FetchedPage};

/// Extensions that never lead to readable text.
const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".mp3", ".mp4", ".zip", ".css",
    ".js", ".xml",
];

/// Progress of a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlProgress {
    /// A URL entered the frontier.
    Discovered { url: String, depth: usize },
    /// A page was fetched and kept.
    Fetched { page: CrawledPage },
    /// A dequeued URL produced no page.
    Skipped {
        url: String,
        depth: usize,
        reason: String,
    },
}

/// Outcome of a session that got past its search.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Kept pages, in completion order
    pub pages: Vec<CrawledPage>,
    /// Number of distinct URLs dispatched to the fetcher
    pub visited: usize,
    pub cancelled: bool,
    pub budget_exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlState {
    Idle,
    Searching,
    Expanding,
    Done,
    Error,
}

/// Search-seeded crawler over a searcher and a fetcher.
pub struct Crawler<S, F> {
    searcher: S,
    fetcher: F,
    registry: Arc<TrustedDomainRegistry>,
}

impl<S: WebSearcher, F: PageFetcher> Crawler<S, F> {
    pub fn new(searcher: S, fetcher: F) -> Self {
        Self {
            searcher,
            fetcher,
            registry: TrustedDomainRegistry::shared(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<TrustedDomainRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &TrustedDomainRegistry {
        &self.registry
    }

    pub fn searcher(&self) -> &S {
        &self.searcher
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run one session without progress reporting.
    pub async fn crawl(
        &self,
        query: &str,
        config: &CrawlerConfig,
        cancel: &CancellationToken,
    ) -> SearchResult<CrawlReport> {
        self.crawl_with_progress(query, config, cancel, None).await
    }

    /// Run one session, reporting progress on `progress`.
    ///
    /// Only the search can fail. A dropped progress receiver cancels the
    /// session without touching the caller's token.
    pub async fn crawl_with_progress(
        &self,
        query: &str,
        config: &CrawlerConfig,
        cancel: &CancellationToken,
        progress: Option<mpsc::Sender<CrawlProgress>>,
    ) -> SearchResult<CrawlReport> {
        let mut session = Session::new(config, &self.registry, cancel.child_token(), progress);

        info!(
            query = %query,
            max_depth = config.max_depth,
            max_pages = config.max_pages,
            concurrency = config.concurrency,
            trusted_only = config.trusted_only,
            searcher = self.searcher.name(),
            fetcher = self.fetcher.name(),
            "Starting crawl"
        );

        if session.cancel.is_cancelled() {
            debug!(query = %query, "Cancelled before search");
            session.transition(CrawlState::Done);
            return Ok(session.into_report());
        }

        session.transition(CrawlState::Searching);
        let hits = match self.searcher.search(query).await {
            Ok(hits) => hits,
            Err(e) => {
                session.transition(CrawlState::Error);
                warn!(query = %query, error = %e, "Search failed, nothing to crawl");
                return Err(e);
            }
        };

        let mut seeded = 0;
        for hit in hits {
            if seeded >= config.max_seeds {
                break;
            }
            let Some(url) = normalize_url(&hit.link) else {
                continue;
            };
            if config.trusted_only && !self.registry.is_trusted(&url) {
                debug!(url = %url, "Dropping untrusted seed");
                continue;
            }
            if session.enqueue(url.clone(), 0).await {
                if !hit.title.trim().is_empty() {
                    session.seed_titles.insert(url, hit.title.trim().to_string());
                }
                seeded += 1;
            }
        }
        debug!(seeds = seeded, "Frontier seeded");

        session.transition(CrawlState::Expanding);
        let fetch_one = |url: String, depth: usize| {
            let fetcher = &self.fetcher;
            async move {
                let fetched = fetcher.fetch(&url).await;
                (url, depth, fetched)
            }
        };

        let mut in_flight = FuturesUnordered::new();
        loop {
            while !session.cancel.is_cancelled()
                && in_flight.len() < config.concurrency.max(1)
                && session.pages.len() + in_flight.len() < config.max_pages
            {
                let Some((url, depth)) = session.frontier.pop_front() else {
                    break;
                };
                if !session.visited.insert(url.clone()) {
                    continue;
                }
                debug!(url = %url, depth, "Fetching page");
                in_flight.push(fetch_one(url, depth));
            }

            let Some((url, depth, fetched)) = in_flight.next().await else {
                break;
            };
            session.absorb(url, depth, fetched).await;
        }

        session.transition(CrawlState::Done);
        let report = session.into_report();
        info!(
            query = %query,
            pages = report.pages.len(),
            visited = report.visited,
            cancelled = report.cancelled,
            budget_exhausted = report.budget_exhausted,
            "Crawl completed"
        );
        Ok(report)
    }
}

/// Mutable state of one crawl session.
struct Session<'a> {
    config: &'a CrawlerConfig,
    registry: &'a TrustedDomainRegistry,
    cancel: CancellationToken,
    progress: Option<mpsc::Sender<CrawlProgress>>,
    state: CrawlState,
    frontier: VecDeque<(String, usize)>,
    /// Visited plus queued
    seen: HashSet<String>,
    visited: HashSet<String>,
    seed_titles: HashMap<String, String>,
    pages: Vec<CrawledPage>,
}

impl<'a> Session<'a> {
    fn new(
        config: &'a CrawlerConfig,
        registry: &'a TrustedDomainRegistry,
        cancel: CancellationToken,
        progress: Option<mpsc::Sender<CrawlProgress>>,
    ) -> Self {
        Self {
            config,
            registry,
            cancel,
            progress,
            state: CrawlState::Idle,
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            visited: HashSet::new(),
            seed_titles: HashMap::new(),
            pages: Vec::new(),
        }
    }

    fn transition(&mut self, next: CrawlState) {
        debug!(from = ?self.state, to = ?next, "Crawl state");
        self.state = next;
    }

    async fn emit(&mut self, event: CrawlProgress) {
        let Some(tx) = &self.progress else {
            return;
        };
        if tx.send(event).await.is_err() {
            debug!("Progress receiver dropped, cancelling crawl");
            self.progress = None;
            self.cancel.cancel();
        }
    }

    /// Queue `url` unless it was already seen. Returns whether it was queued.
    async fn enqueue(&mut self, url: String, depth: usize) -> bool {
        if depth > self.config.max_depth || !self.seen.insert(url.clone()) {
            return false;
        }
        self.frontier.push_back((url.clone(), depth));
        self.emit(CrawlProgress::Discovered { url, depth }).await;
        true
    }

    fn should_follow(&self, link: &str, parent_host: &str) -> bool {
        let lower = link.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }
        if self.config.trusted_only {
            self.registry.is_trusted(link)
        } else {
            host_of(link).is_some_and(|host| host == parent_host)
        }
    }

    async fn absorb(&mut self, url: String, depth: usize, fetched: Option<FetchedPage>) {
        let Some(fetched) = fetched.filter(FetchedPage::has_content) else {
            self.emit(CrawlProgress::Skipped {
                url,
                depth,
                reason: "fetch failed".to_string(),
            })
            .await;
            return;
        };

        // A redirect onto an already visited URL is the same page again.
        let final_url = normalize_url(&fetched.url).unwrap_or_else(|| url.clone());
        if self.config.trusted_only && !self.registry.is_trusted(&final_url) {
            debug!(url = %url, final_url = %final_url, "Redirected off the trusted corpus");
            self.emit(CrawlProgress::Skipped {
                url,
                depth,
                reason: "untrusted redirect".to_string(),
            })
            .await;
            return;
        }
        if final_url != url {
            self.seen.insert(final_url.clone());
            if !self.visited.insert(final_url.clone()) {
                debug!(url = %url, final_url = %final_url, "Redirected to visited page");
                self.emit(CrawlProgress::Skipped {
                    url,
                    depth,
                    reason: "duplicate".to_string(),
                })
                .await;
                return;
            }
        }

        let budget_left = self.pages.len() + 1 < self.config.max_pages;
        if depth < self.config.max_depth && budget_left {
            let parent_host = host_of(&final_url).unwrap_or_default();
            for link in &fetched.links {
                let Some(link) = normalize_url(link) else {
                    continue;
                };
                if self.should_follow(&link, &parent_host) {
                    self.enqueue(link, depth + 1).await;
                }
            }
        }

        let title = fetched
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.seed_titles.get(&url).cloned())
            .unwrap_or_else(|| url.clone());
        let source = self.registry.source_label(&url);
        let mut page = CrawledPage::new(url, fetched.content)
            .with_title(title)
            .with_depth(depth)
            .with_source(source);
        page.links = fetched.links;

        debug!(url = %page.url, depth, chars = page.content_length(), "Page kept");
        self.emit(CrawlProgress::Fetched { page: page.clone() }).await;
        self.pages.push(page);
    }

    fn into_report(self) -> CrawlReport {
        CrawlReport {
            budget_exhausted: self.pages.len() >= self.config.max_pages,
            cancelled: self.cancel.is_cancelled(),
            visited: self.visited.len(),
            pages: self.pages,
        }
    }
}
