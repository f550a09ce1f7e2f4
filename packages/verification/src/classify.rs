//! Pattern-table query heuristics.
//!
//! Every heuristic here is a pure function over a fixed, case-insensitive
//! pattern table. They are intentionally not a classifier: the tables are
//! the contract and tests pin their behavior.

use lazy_static::lazy_static;
use regex::Regex;

use crate::hadith::canonical_collection;
use crate::registry::EvidenceType;
use crate::types::verification::ClaimType;

lazy_static! {
    static ref HADITH_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(hadith|hadeeth|hadis|ahadith|sunnah|narrated|narration|prophet|bukhari|sahih|tirmidhi|abu\s*dawu?d|nasa'?i|ibn\s*majah|muwatta)\b"
    )
    .unwrap();
    static ref QURAN_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(quran|qur'an|koran|surah|sura|ayah|ayat|verses?|tafsir)\b"
    )
    .unwrap();
    static ref SCHOLAR_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(fatwa|fatawa|rulings?|scholars?|mufti|madhhab|fiqh|halal|haram|permissible|opinion)\b"
    )
    .unwrap();
    static ref FATWA_SIGNALS: Regex = Regex::new(
        r"(?i)\b(fatwa|ruling|halal|haram|permissible|permitted|allowed|forbidden|makruh|obligatory|sinful)\b"
    )
    .unwrap();
    static ref SCHOLARLY_SIGNALS: Regex = Regex::new(
        r"(?i)\b(scholars?|opinions?|madhhab|imam|views?|school of thought|consensus|ijma)\b"
    )
    .unwrap();
    static ref PERSONAL_PATTERNS: Vec<Regex> = [
        r"(?i)\b(should|can|may|must|could) i\b",
        r"(?i)\bam i\b",
        r"(?i)\bi (am|have|had|feel|did|was|want|need|made)\b",
        r"(?i)\bmy (husband|wife|spouse|mother|father|mom|dad|parents|son|daughter|child|children|family|brother|sister|boss|friend)\b",
        r"(?i)\bmy (situation|case|marriage|divorce|debt|job|business|health)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
    static ref HADITH_REFERENCE: Regex = Regex::new(
        r"(?i)\b(bukhari|muslim|abu\s*dawu?d|tirmidhi|nasa'?i|ibn\s*majah|malik|muwatta)\b\s*(?:(?:hadith|no\.?|number|#)\s*)?:?\s*(\d{1,5})\b"
    )
    .unwrap();
}

/// Whether the query already uses vocabulary of the given claim type.
pub fn has_type_keywords(query: &str, claim_type: ClaimType) -> bool {
    match claim_type {
        ClaimType::Hadith => HADITH_KEYWORDS.is_match(query),
        ClaimType::Quran => QURAN_KEYWORDS.is_match(query),
        ClaimType::Scholar => SCHOLAR_KEYWORDS.is_match(query),
        ClaimType::General => true,
    }
}

/// Disambiguating suffix for a claim type, if it has one.
pub fn type_suffix(claim_type: ClaimType) -> Option<&'static str> {
    match claim_type {
        ClaimType::Hadith => Some("hadith"),
        ClaimType::Quran => Some("quran"),
        ClaimType::Scholar => Some("islamic ruling"),
        ClaimType::General => None,
    }
}

/// Append the type suffix unless the query already implies the type.
pub fn build_search_query(query: &str, claim_type: ClaimType) -> String {
    let query = query.trim();
    match type_suffix(claim_type) {
        Some(suffix) if !has_type_keywords(query, claim_type) => format!("{query} {suffix}"),
        _ => query.to_string(),
    }
}

/// Evidence types a free-form question is asking for, in a fixed order.
///
/// Empty means no specific type was detected.
pub fn detect_evidence_types(question: &str) -> Vec<EvidenceType> {
    let mut types = Vec::new();
    if QURAN_KEYWORDS.is_match(question) {
        types.push(EvidenceType::Quran);
    }
    if HADITH_KEYWORDS.is_match(question) {
        types.push(EvidenceType::Hadith);
    }
    if FATWA_SIGNALS.is_match(question) {
        types.push(EvidenceType::Fatwa);
    }
    if SCHOLARLY_SIGNALS.is_match(question) {
        types.push(EvidenceType::Scholarly);
    }
    types
}

/// Whether the question describes the asker's own circumstances.
pub fn is_personal_question(question: &str) -> bool {
    PERSONAL_PATTERNS.iter().any(|p| p.is_match(question))
}

/// Explicit `(collection, number)` hadith references, e.g. "Bukhari 6018".
///
/// Collections are returned in their canonical edition-map form.
pub fn find_hadith_references(question: &str) -> Vec<(String, u32)> {
    let mut refs: Vec<(String, u32)> = Vec::new();
    for cap in HADITH_REFERENCE.captures_iter(question) {
        let Some(collection) = cap.get(1).and_then(|m| canonical_collection(m.as_str())) else {
            continue;
        };
        let Some(number) = cap.get(2).and_then(|m| m.as_str().parse().ok()) else {
            continue;
        };
        let reference = (collection.to_string(), number);
        if !refs.contains(&reference) {
            refs.push(reference);
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_appended_when_keyword_absent() {
        assert_eq!(
            build_search_query("is this halal", ClaimType::Quran),
            "is this halal quran"
        );
        assert_eq!(
            build_search_query("actions are by intentions", ClaimType::Hadith),
            "actions are by intentions hadith"
        );
        assert_eq!(
            build_search_query("music", ClaimType::Scholar),
            "music islamic ruling"
        );
    }

    #[test]
    fn test_query_unchanged_when_keyword_present() {
        assert_eq!(
            build_search_query("surah baqarah ruling", ClaimType::Quran),
            "surah baqarah ruling"
        );
        assert_eq!(
            build_search_query("Sahih Bukhari on patience", ClaimType::Hadith),
            "Sahih Bukhari on patience"
        );
        assert_eq!(
            build_search_query("is music HARAM", ClaimType::Scholar),
            "is music HARAM"
        );
    }

    #[test]
    fn test_general_claims_get_no_suffix() {
        assert_eq!(
            build_search_query("  mercy to parents ", ClaimType::General),
            "mercy to parents"
        );
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        // "versed" is not "verse"; "sunnahs" is not "sunnah"
        assert!(!has_type_keywords("well versed", ClaimType::Quran));
        assert!(!has_type_keywords("many sunnahs", ClaimType::Hadith));
    }

    #[test]
    fn test_detect_evidence_types() {
        assert_eq!(
            detect_evidence_types("What does the Quran say about patience?"),
            vec![EvidenceType::Quran]
        );
        assert_eq!(
            detect_evidence_types("Is there a hadith saying music is haram?"),
            vec![EvidenceType::Hadith, EvidenceType::Fatwa]
        );
        assert_eq!(
            detect_evidence_types("What is the opinion of the scholars on zakat?"),
            vec![EvidenceType::Scholarly]
        );
        assert_eq!(
            detect_evidence_types("Is it permissible according to the madhhab?"),
            vec![EvidenceType::Fatwa, EvidenceType::Scholarly]
        );
        assert!(detect_evidence_types("tell me about mercy").is_empty());
    }

    #[test]
    fn test_personal_question_detection() {
        assert!(is_personal_question("Should I pray while travelling?"));
        assert!(is_personal_question("My husband refuses to pay zakat"));
        assert!(is_personal_question("I have missed fasts from years ago"));
        assert!(!is_personal_question("What is the ruling on fasting while travelling?"));
        assert!(!is_personal_question("Explain Surah Al-Ikhlas"));
    }

    #[test]
    fn test_find_hadith_references() {
        assert_eq!(
            find_hadith_references("Is Bukhari 6018 authentic? Also see Sahih Muslim #2564"),
            vec![("bukhari".to_string(), 6018), ("muslim".to_string(), 2564)]
        );
        assert_eq!(
            find_hadith_references("abu dawud hadith 4031 and Abu Dawud 4031"),
            vec![("abudawud".to_string(), 4031)]
        );
        assert!(find_hadith_references("what did bukhari write").is_empty());
    }
}
