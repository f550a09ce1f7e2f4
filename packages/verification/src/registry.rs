//! Trusted-domain registry.
//!
//! A fixed table of reference sites and the kinds of evidence each one can
//! supply. The process-wide table is built once on first use and never
//! mutated; tests can build their own with [`TrustedDomainRegistry::new`].
//!
//! Matching is suffix based: `x.sunnah.com` is trusted because `sunnah.com`
//! is, while `notsunnah.com` is not.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Category of evidence a trusted site can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Quran,
    Hadith,
    Fatwa,
    Scholarly,
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvidenceType::Quran => "quran",
            EvidenceType::Hadith => "hadith",
            EvidenceType::Fatwa => "fatwa",
            EvidenceType::Scholarly => "scholarly",
        };
        f.write_str(s)
    }
}

/// One registered reference site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDomain {
    pub domain: String,
    pub name: String,
    pub evidence_types: HashSet<EvidenceType>,
}

impl TrustedDomain {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        evidence_types: impl IntoIterator<Item = EvidenceType>,
    ) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
            name: name.into(),
            evidence_types: evidence_types.into_iter().collect(),
        }
    }

    /// Whether `host` is this domain or one of its subdomains.
    pub fn matches_host(&self, host: &str) -> bool {
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    pub fn supplies(&self, evidence_type: EvidenceType) -> bool {
        self.evidence_types.contains(&evidence_type)
    }
}

use EvidenceType::{Fatwa, Hadith, Quran, Scholarly};

lazy_static! {
    static ref GLOBAL: Arc<TrustedDomainRegistry> = Arc::new(TrustedDomainRegistry::new(vec![
        TrustedDomain::new("quran.com", "Quran.com", [Quran]),
        TrustedDomain::new("tanzil.net", "Tanzil", [Quran]),
        TrustedDomain::new("alquran.cloud", "AlQuran Cloud", [Quran]),
        TrustedDomain::new("sunnah.com", "Sunnah.com", [Hadith]),
        TrustedDomain::new("dorar.net", "Dorar", [Hadith, Fatwa]),
        TrustedDomain::new("hadithcollection.com", "Hadith Collection", [Hadith]),
        TrustedDomain::new("islamqa.info", "IslamQA", [Fatwa, Scholarly]),
        TrustedDomain::new("islamweb.net", "IslamWeb", [Fatwa, Hadith]),
        TrustedDomain::new("seekersguidance.org", "SeekersGuidance", [Fatwa, Scholarly]),
        TrustedDomain::new("aboutislam.net", "About Islam", [Fatwa]),
        TrustedDomain::new("yaqeeninstitute.org", "Yaqeen Institute", [Scholarly]),
        TrustedDomain::new("islamicity.org", "IslamiCity", [Quran, Scholarly]),
    ]));
}

/// Lookup table over [`TrustedDomain`] entries.
#[derive(Debug, Clone)]
pub struct TrustedDomainRegistry {
    domains: Vec<TrustedDomain>,
}

impl TrustedDomainRegistry {
    pub fn new(domains: Vec<TrustedDomain>) -> Self {
        Self { domains }
    }

    /// The process-wide registry.
    pub fn global() -> &'static TrustedDomainRegistry {
        &GLOBAL
    }

    /// Shared handle to the process-wide registry.
    pub fn shared() -> Arc<TrustedDomainRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn all(&self) -> &[TrustedDomain] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Find the entry covering a bare domain or a full URL.
    pub fn lookup(&self, domain_or_url: &str) -> Option<&TrustedDomain> {
        let host = host_of(domain_or_url)?;
        self.domains.iter().find(|d| d.matches_host(&host))
    }

    pub fn is_trusted(&self, domain_or_url: &str) -> bool {
        self.lookup(domain_or_url).is_some()
    }

    /// Registered domains that supply the given evidence type.
    pub fn domains_for(&self, evidence_type: EvidenceType) -> Vec<&str> {
        self.domains
            .iter()
            .filter(|d| d.supplies(evidence_type))
            .map(|d| d.domain.as_str())
            .collect()
    }

    /// Display label for a URL: the registry name when trusted, else the host.
    pub fn source_label(&self, url: &str) -> String {
        match self.lookup(url) {
            Some(entry) => entry.name.clone(),
            None => host_of(url).unwrap_or_default(),
        }
    }
}

/// Extract a lower-case host from either a URL or a bare domain.
pub(crate) fn host_of(domain_or_url: &str) -> Option<String> {
    let trimmed = domain_or_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://") {
        return url::Url::parse(trimmed)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_end_matches('.').to_lowercase()));
    }
    let host = trimmed
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase();
    (!host.is_empty()).then_some(host)
}
