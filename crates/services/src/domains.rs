//! Domain lookup client (Domainr-compatible API).
//!
//! `search` returns candidate names for a free-text query; `status` reports
//! a whitespace-separated registration summary per name, which
//! [`webdash_core::domains::status_is_available`] interprets.

use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://domainr.p.rapidapi.com";

#[derive(Debug, thiserror::Error)]
pub enum DomainLookupError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Domain API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Registration status of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainStatus {
    pub domain: String,
    #[serde(alias = "summary")]
    pub status: String,
}

#[async_trait]
pub trait DomainLookup: Send + Sync {
    /// Candidate domain names for a query, in relevance order.
    async fn search(&self, query: &str) -> Result<Vec<String>, DomainLookupError>;

    /// Status summaries for the given domains.
    async fn status(&self, domains: &[String]) -> Result<Vec<DomainStatus>, DomainLookupError>;
}

#[derive(Debug, Clone)]
pub struct DomainApiConfig {
    pub api_base: String,
    pub api_key: String,
}

impl DomainApiConfig {
    /// | Variable          | Required | Default                           |
    /// |-------------------|----------|-----------------------------------|
    /// | `DOMAIN_API_BASE` | no       | `https://domainr.p.rapidapi.com`  |
    /// | `DOMAIN_API_KEY`  | no       | empty                             |
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("DOMAIN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key: std::env::var("DOMAIN_API_KEY").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    domain: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Vec<DomainStatus>,
}

pub struct DomainApiClient {
    client: reqwest::Client,
    config: DomainApiConfig,
}

impl DomainApiClient {
    pub fn new(client: reqwest::Client, config: DomainApiConfig) -> Self {
        Self { client, config }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DomainLookupError> {
        let url = format!("{}/v2/{path}", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.config.api_key)
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainLookupError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DomainLookup for DomainApiClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, DomainLookupError> {
        let parsed: SearchResponse = self.get("search", &[("query", query)]).await?;
        Ok(dedup_domains(parsed.results.into_iter().map(|r| r.domain)))
    }

    async fn status(&self, domains: &[String]) -> Result<Vec<DomainStatus>, DomainLookupError> {
        if domains.is_empty() {
            return Ok(Vec::new());
        }
        let joined = domains.join(",");
        let parsed: StatusResponse = self.get("status", &[("domain", &joined)]).await?;
        Ok(parsed.status)
    }
}

/// Lowercase and drop repeats, keeping first-seen order.
fn dedup_domains(domains: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for domain in domains {
        let domain = domain.trim().to_ascii_lowercase();
        if !domain.is_empty() && !seen.contains(&domain) {
            seen.push(domain);
        }
    }
    seen
}
