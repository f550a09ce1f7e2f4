//! Summarizer implementations.
//!
//! - [`OpenAiSummarizer`] - chat-completions backed, evidence-only prompt
//! - [`ExtractiveSummarizer`] - no model; quotes the best snippets

pub mod extractive;
pub mod openai;

pub use extractive::ExtractiveSummarizer;
pub use openai::OpenAiSummarizer;

/// Separator between evidence blocks in the text handed to a summarizer.
pub const EVIDENCE_SEPARATOR: &str = "\n\n---\n\n";

/// One numbered evidence block: `[n] title <url>` followed by the text.
pub fn format_evidence_block(index: usize, title: &str, url: &str, text: &str) -> String {
    format!("[{index}] {title} <{url}>\n{}", text.trim())
}

/// Parsed form of a block written by [`format_evidence_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceBlock<'a> {
    pub index: usize,
    pub title: &'a str,
    pub url: &'a str,
    pub text: &'a str,
}

/// Split summarizer evidence back into blocks, skipping anything malformed.
pub fn parse_evidence(evidence: &str) -> Vec<EvidenceBlock<'_>> {
    evidence
        .split(EVIDENCE_SEPARATOR)
        .filter_map(|block| {
            let (header, text) = block.split_once('\n').unwrap_or((block, ""));
            let rest = header.strip_prefix('[')?;
            let (index, rest) = rest.split_once("] ")?;
            let (title, url) = rest.rsplit_once(" <")?;
            Some(EvidenceBlock {
                index: index.parse().ok()?,
                title,
                url: url.strip_suffix('>')?,
                text: text.trim(),
            })
        })
        .collect()
}
