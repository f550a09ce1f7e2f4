//! Claim verification request/response types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Evidentiary category of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Hadith,
    Quran,
    Scholar,
    #[default]
    General,
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClaimType::Hadith => "hadith",
            ClaimType::Quran => "quran",
            ClaimType::Scholar => "scholar",
            ClaimType::General => "general",
        };
        f.write_str(s)
    }
}

impl FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hadith" => Ok(ClaimType::Hadith),
            "quran" => Ok(ClaimType::Quran),
            "scholar" => Ok(ClaimType::Scholar),
            "general" => Ok(ClaimType::General),
            other => Err(format!("unknown claim type: {other}")),
        }
    }
}

/// Coarse relevance tier. Ordering is best-first: `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

/// One ranked piece of evidence for a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub url: String,
    pub title: String,
    /// Best-matching snippet of the page
    pub content: String,
    pub source: String,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub claim_type: ClaimType,
    #[serde(default)]
    pub original_claim: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub results: Vec<VerificationResult>,
    /// The type-augmented query actually sent to search
    pub query: String,
    /// Result count before truncation
    pub total_found: usize,
}
