//! Lexical relevance scoring and snippet extraction.
//!
//! Both functions are deliberately coarse: lower-cased whitespace tokens
//! longer than three characters, matched as substrings. The thresholds,
//! the token-length cutoff and the window geometry are part of the
//! observable output and must stay exactly as they are.

use crate::types::verification::Relevance;

/// Tokens shorter than this many characters (inclusive) are ignored.
const MIN_TOKEN_CHARS: usize = 3;

const HIGH_THRESHOLD: f64 = 0.5;
const MEDIUM_THRESHOLD: f64 = 0.25;

pub const SNIPPET_WINDOW: usize = 300;
pub const SNIPPET_STEP: usize = 50;
const ELLIPSIS: &str = "...";

/// Lower-cased whitespace-separated words longer than three characters.
///
/// Punctuation stays attached and duplicates are kept.
pub fn significant_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Fraction of the claim's tokens found anywhere in `content + " " + title`.
///
/// A claim without qualifying tokens has ratio 0.
pub fn relevance_ratio(claim: &str, content: &str, title: &str) -> f64 {
    let tokens = significant_tokens(claim);
    if tokens.is_empty() {
        return 0.0;
    }
    let haystack = format!("{} {}", content, title).to_lowercase();
    let matched = tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count();
    matched as f64 / tokens.len() as f64
}

pub fn tier_for_ratio(ratio: f64) -> Relevance {
    if ratio > HIGH_THRESHOLD {
        Relevance::High
    } else if ratio > MEDIUM_THRESHOLD {
        Relevance::Medium
    } else {
        Relevance::Low
    }
}

/// Score a document against a claim.
pub fn score(claim: &str, content: &str, title: &str) -> Relevance {
    tier_for_ratio(relevance_ratio(claim, content, title))
}

/// Pick the 300-character window of `content` that mentions the most
/// query tokens.
///
/// Windows start every 50 characters. Only a strictly higher count
/// replaces the current best, so the earliest window wins ties. Ellipses
/// mark a window that does not start at the beginning or does not reach
/// the end.
pub fn extract_snippet(content: &str, query: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= SNIPPET_WINDOW {
        return content.to_string();
    }

    let tokens = significant_tokens(query);
    let mut best_start = 0;
    let mut best_count = 0;

    for start in (0..=chars.len() - SNIPPET_WINDOW).step_by(SNIPPET_STEP) {
        let window: String = chars[start..start + SNIPPET_WINDOW].iter().collect();
        let window = window.to_lowercase();
        let count = tokens
            .iter()
            .filter(|t| window.contains(t.as_str()))
            .count();
        if count > best_count {
            best_count = count;
            best_start = start;
        }
    }

    let end = best_start + SNIPPET_WINDOW;
    let mut snippet = String::with_capacity(SNIPPET_WINDOW + 2 * ELLIPSIS.len());
    if best_start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.extend(&chars[best_start..end]);
    if end < chars.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_words_are_ignored() {
        assert_eq!(
            significant_tokens("Is the Prayer of a traveller shortened?"),
            vec!["prayer", "traveller", "shortened?"]
        );
        assert!(significant_tokens("is it ok").is_empty());
    }

    #[test]
    fn test_tier_thresholds_are_strict() {
        assert_eq!(tier_for_ratio(0.51), Relevance::High);
        assert_eq!(tier_for_ratio(0.5), Relevance::Medium);
        assert_eq!(tier_for_ratio(0.26), Relevance::Medium);
        assert_eq!(tier_for_ratio(0.25), Relevance::Low);
        assert_eq!(tier_for_ratio(0.0), Relevance::Low);
    }

    #[test]
    fn test_score_uses_substring_match_over_content_and_title() {
        // "fasting" matches inside "breakfasting"; "ramadan" only appears in the title.
        let claim = "fasting during ramadan";
        let ratio = relevance_ratio(claim, "On breakfasting early", "Ramadan rulings");
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(score(claim, "On breakfasting early", "Ramadan rulings"), Relevance::High);
    }

    #[test]
    fn test_score_medium_and_low() {
        let claim = "charity extinguishes sins like water extinguishes fire";
        // four-letter words are kept, duplicates count twice
        assert_eq!(significant_tokens(claim).len(), 7);
        assert_eq!(score(claim, "give charity and drink water", ""), Relevance::Medium);
        assert_eq!(score(claim, "nothing related here", ""), Relevance::Low);
    }

    #[test]
    fn test_empty_claim_scores_low() {
        assert_eq!(relevance_ratio("a an of", "anything", "title"), 0.0);
        assert_eq!(score("", "anything", ""), Relevance::Low);
    }

    #[test]
    fn test_short_content_snippet_is_unchanged() {
        let content = "The best of you are those who learn the Quran and teach it.";
        assert_eq!(extract_snippet(content, "learn quran"), content);
    }

    #[test]
    fn test_snippet_picks_window_with_most_tokens() {
        let filler = "x".repeat(600);
        let content = format!("{filler} patience gratitude prayer {}", "y".repeat(600));
        let snippet = extract_snippet(&content, "patience gratitude prayer");
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("patience gratitude prayer"));
    }

    #[test]
    fn test_snippet_first_window_wins_ties() {
        let content = format!("mercy {} mercy {}", "a".repeat(400), "b".repeat(400));
        let snippet = extract_snippet(&content, "mercy");
        assert!(snippet.starts_with("mercy"));
        assert!(!snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_snippet_counts_characters_not_bytes() {
        let content = "é".repeat(500);
        let snippet = extract_snippet(&content, "nothing");
        assert_eq!(snippet.chars().count(), SNIPPET_WINDOW + 3);
    }

    proptest! {
        #[test]
        fn prop_appending_matching_tokens_never_lowers_ratio(
            claim in "[a-z]{2,8}( [a-z]{2,8}){0,8}",
            content in "[a-z ]{0,200}",
            pick in 0usize..9,
        ) {
            let tokens = significant_tokens(&claim);
            let before = relevance_ratio(&claim, &content, "");
            let appended = match tokens.get(pick % tokens.len().max(1)) {
                Some(token) => format!("{content} {token}"),
                None => content.clone(),
            };
            let after = relevance_ratio(&claim, &appended, "");
            prop_assert!(after >= before);
            prop_assert!(tier_for_ratio(after) <= tier_for_ratio(before));
        }

        #[test]
        fn prop_snippet_of_repeated_terms_is_bounded_and_non_degenerate(
            terms in proptest::collection::vec("[a-z]{4,10}", 1..5),
            repeats in 1usize..80,
        ) {
            let query = terms.join(" ");
            let content = std::iter::repeat(query.as_str())
                .take(repeats)
                .collect::<Vec<_>>()
                .join(" ");
            let snippet = extract_snippet(&content, &query);
            prop_assert!(snippet.chars().count() <= SNIPPET_WINDOW + 6);
            prop_assert!(terms.iter().any(|t| snippet.contains(t.as_str())));
        }
    }
}
