//! Trait seams between the pipeline and its collaborators.
//!
//! Applications plug in search engines, fetchers, summarizers and
//! conversation stores through these traits; `crate::testing` and
//! `crate::stores` provide deterministic implementations of each.

pub mod conversation;
pub mod fetcher;
pub mod searcher;
pub mod summarizer;
