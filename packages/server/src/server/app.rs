use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use verification::{
    fetchers::{FetcherExt, HttpFetcher, RenderingFetcher, SelectiveFetcher},
    searchers::TavilySearcher,
    stores::MemoryConversationStore,
    summarizers::{ExtractiveSummarizer, OpenAiSummarizer},
    ConversationStore, Crawler, CrawlerConfig, FetcherConfig, HadithClient, HadithLookup,
    PageFetcher, ResearchPipeline, Summarizer, TrustedDomainRegistry, VerificationOrchestrator,
    WebSearcher,
};

use crate::config::Config;
use crate::server::routes::{health_handler, research_handler, verify_handler};

pub type AppVerifier = VerificationOrchestrator<Arc<dyn WebSearcher>, Arc<dyn PageFetcher>>;
pub type AppPipeline = ResearchPipeline<Arc<dyn WebSearcher>, Arc<dyn PageFetcher>>;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<AppVerifier>,
    pub research: Arc<AppPipeline>,
    pub registry: Arc<TrustedDomainRegistry>,
    /// After this the verification crawl is cancelled and its partial result returned
    pub verify_timeout: Duration,
}

/// Collaborators the application is assembled from.
pub struct AppParts {
    pub searcher: Arc<dyn WebSearcher>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub hadith: Arc<dyn HadithLookup>,
    pub summarizer: Arc<dyn Summarizer>,
    pub store: Arc<dyn ConversationStore>,
    pub crawl_concurrency: usize,
    pub verify_timeout: Duration,
}

impl AppState {
    pub fn from_parts(parts: AppParts) -> Self {
        let registry = TrustedDomainRegistry::shared();
        let crawler = || {
            Crawler::new(parts.searcher.clone(), parts.fetcher.clone())
                .with_registry(registry.clone())
        };

        let verifier = VerificationOrchestrator::new(crawler())
            .with_config(CrawlerConfig::default().with_concurrency(parts.crawl_concurrency));
        let research = ResearchPipeline::new(crawler(), parts.hadith, parts.summarizer)
            .with_store(parts.store)
            .with_concurrency(parts.crawl_concurrency);

        Self {
            verifier: Arc::new(verifier),
            research: Arc::new(research),
            registry,
            verify_timeout: parts.verify_timeout,
        }
    }
}

/// Build the production fetcher chain: HTTP, optionally routed through the
/// rendering path for configured hosts, optionally rate limited.
pub fn build_fetcher(config: &Config, fetcher_config: &FetcherConfig) -> Result<Arc<dyn PageFetcher>> {
    let http = HttpFetcher::new(fetcher_config.clone()).context("Failed to create HTTP fetcher")?;

    let fetcher: Arc<dyn PageFetcher> = match &config.firecrawl_api_key {
        Some(key) if !config.rendered_hosts.is_empty() => {
            let rendering = RenderingFetcher::new(key.clone(), fetcher_config.clone())
                .context("Failed to create rendering fetcher")?;
            tracing::info!(hosts = ?config.rendered_hosts, "Rendering enabled for hosts");
            Arc::new(SelectiveFetcher::new(http, rendering).render_hosts(config.rendered_hosts.clone()))
        }
        _ => Arc::new(http),
    };

    Ok(match config.fetch_rate_per_second {
        Some(rps) => Arc::new(fetcher.rate_limited(rps)),
        None => fetcher,
    })
}

pub fn build_summarizer(config: &Config) -> Result<Arc<dyn Summarizer>> {
    let Some(key) = &config.openai_api_key else {
        tracing::warn!("OPENAI_API_KEY not set, answers will quote evidence only");
        return Ok(Arc::new(ExtractiveSummarizer::new()));
    };

    let mut summarizer = OpenAiSummarizer::new(key.clone())
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to create OpenAI summarizer")?;
    if let Some(model) = &config.openai_model {
        summarizer = summarizer.with_model(model.clone());
    }
    Ok(Arc::new(summarizer))
}

pub fn build_searcher(config: &Config) -> Result<Arc<dyn WebSearcher>> {
    let searcher = TavilySearcher::new(config.tavily_api_key.clone())
        .context("Failed to create search client")?;
    Ok(Arc::new(searcher))
}

/// Assemble production services from configuration.
pub fn build_state(config: &Config) -> Result<AppState> {
    let fetcher_config = FetcherConfig::default();

    let searcher = build_searcher(config)?;
    let hadith: Arc<dyn HadithLookup> =
        Arc::new(HadithClient::new(&fetcher_config).context("Failed to create hadith client")?);

    Ok(AppState::from_parts(AppParts {
        searcher,
        fetcher: build_fetcher(config, &fetcher_config)?,
        hadith,
        summarizer: build_summarizer(config)?,
        store: Arc::new(MemoryConversationStore::new()),
        crawl_concurrency: config.crawl_concurrency,
        verify_timeout: config.verify_timeout,
    }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid allowed origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/verify", post(verify_handler))
        .route("/api/research", post(research_handler))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
