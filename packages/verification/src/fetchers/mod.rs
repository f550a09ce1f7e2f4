//! Page fetcher implementations.
//!
//! - `HttpFetcher` - plain HTTP with HTML normalization
//! - `RenderingFetcher` - Firecrawl-rendered fetch for script-built pages
//! - `SelectiveFetcher` - routes configured hosts to the rendering path
//! - `RateLimitedFetcher` - token-bucket wrapper over any fetcher

pub mod html;
pub mod http;
pub mod rate_limited;
pub mod rendering;
pub mod selective;

pub use http::HttpFetcher;
pub use rate_limited::{FetcherExt, RateLimitedFetcher};
pub use rendering::RenderingFetcher;
pub use selective::SelectiveFetcher;
