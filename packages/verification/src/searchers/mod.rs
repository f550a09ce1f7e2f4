//! Search adapter implementations.

pub mod tavily;

pub use tavily::TavilySearcher;
