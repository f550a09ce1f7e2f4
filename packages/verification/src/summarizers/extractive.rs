//! Model-free fallback summarizer.
//!
//! Quotes the snippets of the evidence blocks that best match the question,
//! each with its citation number. Used when no model API key is configured.

use async_trait::async_trait;

use crate::relevance::{extract_snippet, relevance_ratio};
use crate::summarizers::parse_evidence;
use crate::traits::summarizer::{Summarizer, SummarizerError};

const DEFAULT_MAX_QUOTES: usize = 3;

pub const NO_EVIDENCE_ANSWER: &str =
    "No relevant evidence was found in the trusted sources for this question.";

#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    max_quotes: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self {
            max_quotes: DEFAULT_MAX_QUOTES,
        }
    }
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_quotes(mut self, max_quotes: usize) -> Self {
        self.max_quotes = max_quotes.max(1);
        self
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, question: &str, evidence: &str) -> Result<String, SummarizerError> {
        let mut ranked: Vec<_> = parse_evidence(evidence)
            .into_iter()
            .filter(|block| !block.text.is_empty())
            .map(|block| (relevance_ratio(question, block.text, block.title), block))
            .collect();
        if ranked.is_empty() {
            return Ok(NO_EVIDENCE_ANSWER.to_string());
        }

        // best first; the sort is stable so evidence order breaks ties
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let quotes: Vec<String> = ranked
            .iter()
            .take(self.max_quotes)
            .map(|(_, block)| {
                format!(
                    "- {} ({}) [{}]",
                    extract_snippet(block.text, question),
                    block.title,
                    block.index
                )
            })
            .collect();

        Ok(format!(
            "The trusted sources gathered for this question say:\n\n{}\n\nRead the cited sources in full before drawing a conclusion.",
            quotes.join("\n")
        ))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}
