//! Configuration types for crawling and fetching.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Caller-selected quality/latency/cost trade-off for one crawl.
///
/// The profile is always chosen explicitly by the caller; nothing in the
/// pipeline infers it from the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalProfile {
    /// Search results only, no recursion.
    #[default]
    Quick,
    /// One hop from each search result.
    Standard,
    /// Up to three hops.
    Deep,
}

impl TraversalProfile {
    pub fn max_depth(self) -> usize {
        match self {
            TraversalProfile::Quick => 0,
            TraversalProfile::Standard => 1,
            TraversalProfile::Deep => 3,
        }
    }

    /// Page budget for the whole session.
    pub fn max_pages(self) -> usize {
        match self {
            TraversalProfile::Quick => 5,
            TraversalProfile::Standard => 15,
            TraversalProfile::Deep => 40,
        }
    }

    /// How many search results seed the frontier.
    pub fn sources_to_fetch(self) -> usize {
        match self {
            TraversalProfile::Quick => 5,
            TraversalProfile::Standard => 8,
            TraversalProfile::Deep => 10,
        }
    }
}

impl fmt::Display for TraversalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TraversalProfile::Quick => "quick",
            TraversalProfile::Standard => "standard",
            TraversalProfile::Deep => "deep",
        };
        f.write_str(s)
    }
}

impl FromStr for TraversalProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(TraversalProfile::Quick),
            "standard" => Ok(TraversalProfile::Standard),
            "deep" => Ok(TraversalProfile::Deep),
            other => Err(format!("unknown traversal profile: {other}")),
        }
    }
}

/// Configuration for one crawl session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link hops from a search seed (0 = seeds only)
    pub max_depth: usize,

    /// Maximum number of pages emitted by the session
    pub max_pages: usize,

    /// Maximum number of search results used as seeds
    pub max_seeds: usize,

    /// Maximum concurrent page fetches
    pub concurrency: usize,

    /// Only seed and follow registry-listed domains
    pub trusted_only: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::from_profile(TraversalProfile::default())
    }
}

impl CrawlerConfig {
    pub fn from_profile(profile: TraversalProfile) -> Self {
        Self {
            max_depth: profile.max_depth(),
            max_pages: profile.max_pages(),
            max_seeds: profile.sources_to_fetch(),
            concurrency: 4,
            trusted_only: true,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    pub fn with_max_seeds(mut self, max: usize) -> Self {
        self.max_seeds = max;
        self
    }

    /// Set the worker cap. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_trusted_only(mut self, trusted_only: bool) -> Self {
        self.trusted_only = trusted_only;
        self
    }
}

/// Configuration for page fetchers.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for general page fetches
    pub timeout: Duration,

    /// Timeout for structured-data APIs
    pub api_timeout: Duration,

    /// Maximum characters of normalized content kept per page
    pub max_content_chars: usize,

    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            api_timeout: Duration::from_secs(5),
            max_content_chars: 4000,
            user_agent: "Mozilla/5.0 (compatible; TrustedSourcesBot/1.0)".to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
