//! Outbound URL checks.
//!
//! Crawled links come from arbitrary HTML, so every request target passes
//! through [`UrlValidator::check`] before a request is made, and every
//! redirect hop passes through it again via [`UrlValidator::redirect_policy`].

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;
use lazy_static::lazy_static;
use reqwest::redirect;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

pub const MAX_URL_LEN: usize = 2048;
pub const MAX_REDIRECTS: usize = 5;

/// Cloud metadata names outside the `.internal` suffix.
const METADATA_HOSTS: &[&str] = &["instance-data", "metadata"];

lazy_static! {
    static ref BLOCKED_NETS: Vec<IpNet> = [
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "::/128",
        "::1/128",
        "fc00::/7",
        "fe80::/10",
    ]
    .iter()
    .map(|net| net.parse().unwrap())
    .collect();
}

/// Rejects targets a crawler must never reach: non-HTTP schemes, embedded
/// credentials, oversized URLs, local and metadata hostnames, and literal
/// addresses in private or link-local ranges.
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
    /// Skip host and address checks for these (local test servers)
    exempt_hosts: HashSet<String>,
}

impl UrlValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exempt_host(mut self, host: impl Into<String>) -> Self {
        self.exempt_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    /// Parse and check, returning the parsed URL.
    pub fn check_str(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url)?;
        self.check(&parsed)?;
        Ok(parsed)
    }

    pub fn check(&self, url: &Url) -> SecurityResult<()> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SecurityError::DisallowedScheme(url.scheme().to_string()));
        }
        if url.as_str().len() > MAX_URL_LEN {
            return Err(SecurityError::UrlTooLong(url.as_str().len()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(SecurityError::EmbeddedCredentials);
        }

        let host = url.host().ok_or(SecurityError::NoHost)?;
        if self
            .exempt_hosts
            .contains(&url.host_str().unwrap_or_default().to_ascii_lowercase())
        {
            return Ok(());
        }

        match host {
            Host::Domain(domain) => check_domain(domain),
            Host::Ipv4(v4) => check_ip(IpAddr::V4(v4)),
            // ::ffff:a.b.c.d reaches the IPv4 address
            Host::Ipv6(v6) => check_ip(v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4)),
        }
    }

    /// Redirect policy for HTTP clients: every hop is checked and chains
    /// longer than [`MAX_REDIRECTS`] fail.
    pub fn redirect_policy(&self) -> redirect::Policy {
        let validator = self.clone();
        redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error(SecurityError::TooManyRedirects);
            }
            match validator.check(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(e) => attempt.error(e),
            }
        })
    }
}

fn check_domain(domain: &str) -> SecurityResult<()> {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let blocked = domain == "localhost"
        || domain.ends_with(".localhost")
        || domain.ends_with(".internal")
        || METADATA_HOSTS.contains(&domain.as_str());
    if blocked {
        return Err(SecurityError::BlockedHost(domain));
    }
    Ok(())
}

fn check_ip(ip: IpAddr) -> SecurityResult<()> {
    if BLOCKED_NETS.iter().any(|net| net.contains(&ip)) {
        return Err(SecurityError::BlockedCidr(ip.to_string()));
    }
    Ok(())
}
