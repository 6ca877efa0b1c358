//! AI site builder client.
//!
//! Generation is a two-step exchange: create a site slot, wait a fixed
//! interval while the builder provisions it, then request generation with a
//! brief built from the questionnaire answers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use webdash_core::site_generation::{is_generation_success, site_reference};

const DEFAULT_WAIT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum SiteBuilderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Site builder returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Site builder did not return a site id")]
    MissingSiteId,

    #[error("Site builder reported failure: {0}")]
    Rejected(String),
}

/// Outcome of a successful generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSite {
    pub site_id: String,
    pub website_url: Option<String>,
    pub editor_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteRequest {
    pub business_name: String,
    pub email: String,
    pub brief: String,
}

#[async_trait]
pub trait SiteBuilder: Send + Sync {
    async fn generate(&self, request: &SiteRequest) -> Result<GeneratedSite, SiteBuilderError>;
}

#[derive(Debug, Clone)]
pub struct SiteBuilderConfig {
    pub api_base: String,
    pub api_key: String,
    /// Pause between creating the slot and requesting generation.
    pub wait: Duration,
}

impl SiteBuilderConfig {
    /// | Variable                 | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `SITE_BUILDER_API_BASE`  | no       | empty   |
    /// | `SITE_BUILDER_API_KEY`   | no       | empty   |
    /// | `SITE_BUILDER_WAIT_SECS` | no       | `60`    |
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("SITE_BUILDER_API_BASE").unwrap_or_default(),
            api_key: std::env::var("SITE_BUILDER_API_KEY").unwrap_or_default(),
            wait: Duration::from_secs(
                std::env::var("SITE_BUILDER_WAIT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAIT_SECS),
            ),
        }
    }
}

pub struct SiteBuilderClient {
    client: reqwest::Client,
    config: SiteBuilderConfig,
}

impl SiteBuilderClient {
    pub fn new(client: reqwest::Client, config: SiteBuilderConfig) -> Self {
        Self { client, config }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, SiteBuilderError> {
        let url = format!("{}/{path}", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteBuilderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SiteBuilder for SiteBuilderClient {
    async fn generate(&self, request: &SiteRequest) -> Result<GeneratedSite, SiteBuilderError> {
        let created = self
            .post(
                "sites",
                &json!({ "name": request.business_name, "email": request.email }),
            )
            .await?;
        let site_id = site_reference(&created).ok_or(SiteBuilderError::MissingSiteId)?;
        tracing::info!(site_id = %site_id, wait_secs = self.config.wait.as_secs(), "Site slot created");

        tokio::time::sleep(self.config.wait).await;

        let generated = self
            .post(
                &format!("sites/{site_id}/generate"),
                &json!({ "prompt": request.brief }),
            )
            .await?;
        interpret_generation(site_id, &generated)
    }
}

fn interpret_generation(site_id: String, response: &Value) -> Result<GeneratedSite, SiteBuilderError> {
    if !is_generation_success(response) {
        let reason = response
            .get("message")
            .or_else(|| response.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unrecognized response")
            .to_string();
        return Err(SiteBuilderError::Rejected(reason));
    }
    let find = |keys: &[&str]| {
        keys.iter().find_map(|k| {
            response
                .get(*k)
                .or_else(|| response.get("data").and_then(|d| d.get(*k)))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };
    Ok(GeneratedSite {
        website_url: find(&["website_url", "websiteUrl", "url", "preview_url"]),
        editor_url: find(&["editor_url", "editorUrl"]),
        site_id,
    })
}
