use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CRAWL_CONCURRENCY: usize = 4;
const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub tavily_api_key: String,
    /// Without a key answers fall back to extractive summaries
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub firecrawl_api_key: Option<String>,
    /// Hosts fetched through the rendering path (needs `firecrawl_api_key`)
    pub rendered_hosts: Vec<String>,
    pub crawl_concurrency: usize,
    /// Budget for one verification request before its crawl is cancelled
    pub verify_timeout: Duration,
    pub fetch_rate_per_second: Option<u32>,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: match env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid number")?,
                Err(_) => DEFAULT_PORT,
            },
            tavily_api_key: env::var("TAVILY_API_KEY").context("TAVILY_API_KEY must be set")?,
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            openai_model: non_empty(env::var("OPENAI_MODEL").ok()),
            firecrawl_api_key: non_empty(env::var("FIRECRAWL_API_KEY").ok()),
            rendered_hosts: parse_list(&env::var("RENDERED_HOSTS").unwrap_or_default()),
            crawl_concurrency: match env::var("CRAWL_CONCURRENCY") {
                Ok(n) => n
                    .parse()
                    .context("CRAWL_CONCURRENCY must be a positive number")?,
                Err(_) => DEFAULT_CRAWL_CONCURRENCY,
            },
            verify_timeout: Duration::from_secs(match env::var("VERIFY_TIMEOUT_SECS") {
                Ok(secs) => secs
                    .parse()
                    .context("VERIFY_TIMEOUT_SECS must be a number of seconds")?,
                Err(_) => DEFAULT_VERIFY_TIMEOUT_SECS,
            }),
            fetch_rate_per_second: env::var("FETCH_RATE_PER_SECOND")
                .ok()
                .map(|r| r.parse())
                .transpose()
                .context("FETCH_RATE_PER_SECOND must be a number")?,
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

/// Split a comma-separated setting, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
