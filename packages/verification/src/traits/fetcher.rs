//! Page fetcher trait.

use async_trait::async_trait;

use crate::types::page::FetchedPage;

/// Fetches and normalizes a single page.
///
/// Fetchers never fail loudly: timeouts, non-2xx statuses, transport
/// errors and blocked URLs are logged and reported as `None`, which the
/// crawler treats as "skip this page".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<FetchedPage>;

    /// Fetcher name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        (**self).fetch(url).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
