//! Trusted-Source Retrieval and Claim Verification
//!
//! Answers questions and checks claims about Islam against a fixed registry
//! of reference sites (Quran, hadith, fatwa and scholarly sources).
//!
//! # Design Philosophy
//!
//! - Trusted corpus first: seeds and followed links are registry-checked
//! - Bounded everything: depth, page budget, concurrency and timeouts
//! - Fetch failures skip a page; only a failed search ends a session
//! - Library handles retrieval, collaborators handle prose and storage
//!
//! # Usage
//!
//! ```rust,ignore
//! use verification::{Crawler, VerificationOrchestrator, ClaimType};
//! use verification::testing::{MockFetcher, MockSearcher};
//!
//! let crawler = Crawler::new(MockSearcher::new(), MockFetcher::new());
//! let verifier = VerificationOrchestrator::new(crawler);
//!
//! let response = verifier
//!     .verify("charity extinguishes sins", ClaimType::Hadith, "")
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`registry`] - Trusted-domain registry
//! - [`crawler`] - Search-seeded bounded BFS crawler
//! - [`verify`] - Claim verification orchestrator
//! - [`research`] - Streaming research pipeline
//! - [`relevance`] - Lexical scoring and snippet extraction
//! - [`classify`] - Query heuristics over fixed pattern tables
//! - [`hadith`] - Structured hadith lookups
//! - [`fetchers`] / [`searchers`] / [`summarizers`] / [`stores`] - Collaborator implementations
//! - [`security`] - Credential handling and SSRF protection
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod crawler;
pub mod error;
pub mod fetchers;
pub mod hadith;
pub mod registry;
pub mod relevance;
pub mod research;
pub mod searchers;
pub mod security;
pub mod stores;
pub mod summarizers;
pub mod testing;
pub mod traits;
pub mod types;
pub mod verify;

// Re-export core types at crate root
pub use crawler::{CrawlProgress, CrawlReport, Crawler};
pub use error::{FetchError, Result, SearchError, SecurityError, VerifyError};
pub use hadith::{HadithClient, HadithLookup, HadithRecord};
pub use registry::{EvidenceType, TrustedDomain, TrustedDomainRegistry};
pub use research::{ResearchPipeline, ResearchRequest};
pub use traits::{
    conversation::{ConversationRecord, ConversationStore},
    fetcher::PageFetcher,
    searcher::{SearchHit, WebSearcher},
    summarizer::Summarizer,
};
pub use types::{
    config::{CrawlerConfig, FetcherConfig, TraversalProfile},
    events::{decode_event, EventCollector, EventSink, EventSource, EventType, ResearchStepEvent},
    page::{CrawledPage, FetchedPage},
    verification::{ClaimType, Relevance, VerificationResult, VerifyRequest, VerifyResponse},
};
pub use verify::VerificationOrchestrator;
