//! Routes selected hosts to a rendering fetcher.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::registry::host_of;
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

/// Sends pages on `rendered_hosts` (and their subdomains) to `rendering`,
/// everything else to `plain`.
pub struct SelectiveFetcher<P: PageFetcher, R: PageFetcher> {
    plain: P,
    rendering: R,
    rendered_hosts: HashSet<String>,
}

impl<P: PageFetcher, R: PageFetcher> SelectiveFetcher<P, R> {
    pub fn new(plain: P, rendering: R) -> Self {
        Self {
            plain,
            rendering,
            rendered_hosts: HashSet::new(),
        }
    }

    pub fn render_host(mut self, host: impl Into<String>) -> Self {
        self.rendered_hosts.insert(host.into().to_lowercase());
        self
    }

    pub fn render_hosts(mut self, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for host in hosts {
            self = self.render_host(host);
        }
        self
    }

    pub fn needs_rendering(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        self.rendered_hosts.iter().any(|h| {
            host == *h
                || host
                    .strip_suffix(h.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[async_trait]
impl<P: PageFetcher, R: PageFetcher> PageFetcher for SelectiveFetcher<P, R> {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        if self.needs_rendering(url) {
            self.rendering.fetch(url).await
        } else {
            self.plain.fetch(url).await
        }
    }

    fn name(&self) -> &str {
        "selective"
    }
}
