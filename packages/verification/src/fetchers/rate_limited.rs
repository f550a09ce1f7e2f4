//! Rate-limited fetcher wrapper.
//!
//! Wraps any fetcher with a process-wide token bucket using the governor
//! crate, so concurrent crawl sessions share one request budget.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};

use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub struct RateLimitedFetcher<F: PageFetcher> {
    inner: F,
    limiter: Arc<DefaultRateLimiter>,
}

impl<F: PageFetcher> RateLimitedFetcher<F> {
    /// Limit to `requests_per_second` (zero is treated as one).
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        Self::with_quota(fetcher, Quota::per_second(non_zero(requests_per_second)))
    }

    /// Sustained rate with a burst allowance.
    pub fn with_burst(fetcher: F, requests_per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(non_zero(requests_per_second)).allow_burst(non_zero(burst));
        Self::with_quota(fetcher, quota)
    }

    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

fn non_zero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch(url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait FetcherExt: PageFetcher + Sized {
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::new(self, requests_per_second)
    }
}

impl<F: PageFetcher + Sized> FetcherExt for F {}
