//! Structured hadith lookups.
//!
//! When a question cites a hadith by collection and number, the text is
//! pulled from a public hadith edition API instead of being crawled. The
//! edition map is fixed for the life of the process. Lookups use the short
//! structured-API timeout and fail soft like page fetches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::types::config::FetcherConfig;

const HADITH_API_URL: &str = "https://cdn.jsdelivr.net/gh/fawazahmed0/hadith-api@1/editions";

/// Canonical collection key, API edition, display name.
const EDITIONS: &[(&str, &str, &str)] = &[
    ("bukhari", "eng-bukhari", "Sahih al-Bukhari"),
    ("muslim", "eng-muslim", "Sahih Muslim"),
    ("abudawud", "eng-abudawud", "Sunan Abi Dawud"),
    ("tirmidhi", "eng-tirmidhi", "Jami` at-Tirmidhi"),
    ("nasai", "eng-nasai", "Sunan an-Nasa'i"),
    ("ibnmajah", "eng-ibnmajah", "Sunan Ibn Majah"),
    ("malik", "eng-malik", "Muwatta Malik"),
];

/// Map a spelled-out collection name onto its edition-map key.
///
/// `"Abu Dawud"`, `"abu dawd"` and `"abudawud"` all map to `abudawud`.
pub fn canonical_collection(name: &str) -> Option<&'static str> {
    let squashed: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let key = match squashed.as_str() {
        "abudawd" => "abudawud",
        "muwatta" => "malik",
        other => other,
    };
    EDITIONS.iter().find(|(k, _, _)| *k == key).map(|(k, _, _)| *k)
}

/// API edition identifier for a canonical collection key.
pub fn edition_for(collection: &str) -> Option<&'static str> {
    EDITIONS
        .iter()
        .find(|(k, _, _)| *k == collection)
        .map(|(_, edition, _)| *edition)
}

pub fn collection_name(collection: &str) -> Option<&'static str> {
    EDITIONS
        .iter()
        .find(|(k, _, _)| *k == collection)
        .map(|(_, _, name)| *name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithGrade {
    pub name: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithRecord {
    pub collection: String,
    pub number: u32,
    pub text: String,
    #[serde(default)]
    pub grades: Vec<HadithGrade>,
    /// Human-readable page for the hadith on sunnah.com
    pub url: String,
}

impl HadithRecord {
    pub fn title(&self) -> String {
        format!(
            "{} {}",
            collection_name(&self.collection).unwrap_or(self.collection.as_str()),
            self.number
        )
    }
}

/// Structured lookup of a single hadith.
#[async_trait]
pub trait HadithLookup: Send + Sync {
    /// `None` when the collection is unknown or the lookup failed.
    async fn lookup(&self, collection: &str, number: u32) -> Option<HadithRecord>;
}

#[derive(Deserialize)]
struct EditionResponse {
    hadiths: Vec<EditionHadith>,
}

#[derive(Deserialize)]
struct EditionHadith {
    text: String,
    #[serde(default)]
    grades: Vec<HadithGrade>,
}

/// Client for the hadith edition API.
pub struct HadithClient {
    client: reqwest::Client,
    api_url: String,
}

impl HadithClient {
    pub fn new(config: &FetcherConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self {
            client,
            api_url: HADITH_API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn edition_url(&self, collection: &str, number: u32) -> Option<String> {
        edition_for(collection).map(|edition| format!("{}/{}/{}.json", self.api_url, edition, number))
    }

    pub async fn try_lookup(&self, collection: &str, number: u32) -> FetchResult<Option<HadithRecord>> {
        let Some(url) = self.edition_url(collection, number) else {
            return Ok(None);
        };

        debug!(url = %url, "Hadith lookup");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: EditionResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        Ok(body
            .hadiths
            .into_iter()
            .find(|h| !h.text.trim().is_empty())
            .map(|h| HadithRecord {
                collection: collection.to_string(),
                number,
                text: h.text.trim().to_string(),
                grades: h.grades,
                url: format!("https://sunnah.com/{collection}:{number}"),
            }))
    }
}

#[async_trait]
impl HadithLookup for HadithClient {
    async fn lookup(&self, collection: &str, number: u32) -> Option<HadithRecord> {
        match self.try_lookup(collection, number).await {
            Ok(record) => record,
            Err(e) => {
                warn!(collection = %collection, number, error = %e, "Hadith lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_collection() {
        assert_eq!(canonical_collection("Bukhari"), Some("bukhari"));
        assert_eq!(canonical_collection("Abu Dawud"), Some("abudawud"));
        assert_eq!(canonical_collection("abu dawd"), Some("abudawud"));
        assert_eq!(canonical_collection("Nasa'i"), Some("nasai"));
        assert_eq!(canonical_collection("ibn majah"), Some("ibnmajah"));
        assert_eq!(canonical_collection("Muwatta"), Some("malik"));
        assert_eq!(canonical_collection("ahmad"), None);
    }

    #[test]
    fn test_edition_urls() {
        let client = HadithClient::new(&FetcherConfig::default())
            .unwrap()
            .with_api_url("https://hadith.example");
        assert_eq!(
            client.edition_url("muslim", 2564).as_deref(),
            Some("https://hadith.example/eng-muslim/2564.json")
        );
        assert_eq!(client.edition_url("ahmad", 1), None);
    }

    #[test]
    fn test_edition_response_parsing() {
        let body = r#"{"metadata":{"name":"Sahih al Bukhari"},"hadiths":[{"hadithnumber":1,"text":" Actions are judged by intentions ","grades":[{"name":"Al-Albani","grade":"Sahih"}]}]}"#;
        let parsed: EditionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.hadiths[0].grades[0].grade, "Sahih");
    }

    #[tokio::test]
    async fn test_unknown_collection_makes_no_request() {
        let client = HadithClient::new(&FetcherConfig::default())
            .unwrap()
            .with_api_url("http://trusted-sources.invalid");
        assert!(matches!(client.try_lookup("ahmad", 1).await, Ok(None)));
        assert_eq!(client.lookup("bukhari", 1).await, None);
    }

    #[test]
    fn test_record_title() {
        let record = HadithRecord {
            collection: "bukhari".into(),
            number: 1,
            text: "Actions are judged by intentions".into(),
            grades: vec![],
            url: "https://sunnah.com/bukhari:1".into(),
        };
        assert_eq!(record.title(), "Sahih al-Bukhari 1");
    }
}
