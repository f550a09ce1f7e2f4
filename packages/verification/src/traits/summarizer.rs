//! Summarizer collaborator.
//!
//! Turns gathered evidence into prose. It is only ever called after
//! evidence collection, and it receives the evidence verbatim; keeping the
//! answer grounded in that evidence is the implementation's prompt
//! contract.

use async_trait::async_trait;

pub type SummarizerError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, question: &str, evidence: &str) -> Result<String, SummarizerError>;

    fn name(&self) -> &str {
        "unknown"
    }
}
