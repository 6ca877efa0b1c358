//! Stripe REST client: checkout sessions, customer lookup and
//! subscription cancellation.
//!
//! Stripe takes form-encoded bodies with bracketed keys
//! (`line_items[0][price]`) and a bearer secret key.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use webdash_core::plans::{BillingCycle, PlanTier, ALL_PLANS};
use webdash_core::types::UserId;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stripe returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// No Stripe price is configured for this plan and cycle.
    #[error("No price configured for {plan} ({cycle})")]
    MissingPrice { plan: &'static str, cycle: &'static str },

    #[error("Stripe response missing {0}")]
    MalformedResponse(&'static str),
}

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub email: String,
    pub plan: PlanTier,
    pub cycle: BillingCycle,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    email: Option<String>,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a subscription-mode Checkout Session.
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, StripeError>;

    /// Email on a customer record. `None` for deleted customers or customers
    /// without an email.
    async fn customer_email(&self, customer_id: &str) -> Result<Option<String>, StripeError>;

    /// Schedule cancellation at the end of the current period.
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), StripeError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
    /// Price ids keyed by plan and cycle.
    pub prices: HashMap<(PlanTier, BillingCycle), String>,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                          | Required | Default                  |
    /// |-----------------------------------|----------|--------------------------|
    /// | `STRIPE_SECRET_KEY`               | no       | empty (calls will fail)  |
    /// | `STRIPE_API_BASE`                 | no       | `https://api.stripe.com` |
    /// | `STRIPE_PRICE_{PLAN}_{CYCLE}`     | no       | -                        |
    ///
    /// Price variables are named like `STRIPE_PRICE_BUSINESS_ANNUAL`.
    pub fn from_env() -> Self {
        let mut prices = HashMap::new();
        for plan in ALL_PLANS {
            for cycle in [BillingCycle::Monthly, BillingCycle::Annual] {
                if let Ok(price) = std::env::var(price_env_var(*plan, cycle)) {
                    prices.insert((*plan, cycle), price);
                }
            }
        }
        Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            prices,
        }
    }

    pub fn price_for(&self, plan: PlanTier, cycle: BillingCycle) -> Result<&str, StripeError> {
        self.prices
            .get(&(plan, cycle))
            .map(String::as_str)
            .ok_or(StripeError::MissingPrice {
                plan: plan.as_str(),
                cycle: cycle.as_str(),
            })
    }
}

fn price_env_var(plan: PlanTier, cycle: BillingCycle) -> String {
    format!(
        "STRIPE_PRICE_{}_{}",
        plan.as_str().to_ascii_uppercase(),
        cycle.as_str().to_ascii_uppercase()
    )
}

/// Form fields for a subscription Checkout Session.
///
/// The user id travels three ways (success URL, metadata and
/// `client_reference_id`) so webhook reconciliation can recover it from
/// whichever survives.
fn checkout_form(request: &CheckoutRequest, price: &str) -> Vec<(String, String)> {
    let user_id = request.user_id.to_string();
    vec![
        ("mode".into(), "subscription".into()),
        ("line_items[0][price]".into(), price.to_string()),
        ("line_items[0][quantity]".into(), "1".into()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("customer_email".into(), request.email.clone()),
        ("client_reference_id".into(), user_id.clone()),
        ("metadata[userId]".into(), user_id.clone()),
        ("metadata[planType]".into(), request.plan.as_str().into()),
        ("metadata[billingCycle]".into(), request.cycle.as_str().into()),
        ("subscription_data[metadata][userId]".into(), user_id),
    ]
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct StripeGateway {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.api_base.trim_end_matches('/'))
    }

    /// Turn a non-2xx response into [`StripeError::Api`], keeping Stripe's
    /// own error message when the body has one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StripeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or(body);
        Err(StripeError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, StripeError> {
        let price = self.config.price_for(request.plan, request.cycle)?;
        let response = self
            .client
            .post(self.url("checkout/sessions"))
            .bearer_auth(&self.config.secret_key)
            .form(&checkout_form(request, price))
            .send()
            .await?;
        let session: CheckoutSession = Self::check(response).await?.json().await?;
        if session.url.is_none() {
            return Err(StripeError::MalformedResponse("checkout url"));
        }
        Ok(session)
    }

    async fn customer_email(&self, customer_id: &str) -> Result<Option<String>, StripeError> {
        let response = self
            .client
            .get(self.url(&format!("customers/{customer_id}")))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;
        let customer: Customer = Self::check(response).await?.json().await?;
        if customer.deleted {
            return Ok(None);
        }
        Ok(customer.email.filter(|e| !e.trim().is_empty()))
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), StripeError> {
        let response = self
            .client
            .post(self.url(&format!("subscriptions/{subscription_id}")))
            .bearer_auth(&self.config.secret_key)
            .form(&[("cancel_at_period_end", "true")])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            user_id: uuid::Uuid::nil(),
            email: "owner@shop.com".into(),
            plan: PlanTier::Business,
            cycle: BillingCycle::Annual,
            success_url: "https://app.webdash.io/payment/success?userId=00000000-0000-0000-0000-000000000000".into(),
            cancel_url: "https://app.webdash.io/pricing".into(),
        }
    }

    #[test]
    fn price_env_var_names() {
        assert_eq!(
            price_env_var(PlanTier::Business, BillingCycle::Annual),
            "STRIPE_PRICE_BUSINESS_ANNUAL"
        );
        assert_eq!(
            price_env_var(PlanTier::Launch, BillingCycle::Monthly),
            "STRIPE_PRICE_LAUNCH_MONTHLY"
        );
    }

    #[test]
    fn missing_price_is_an_error() {
        let config = StripeConfig {
            secret_key: String::new(),
            api_base: DEFAULT_API_BASE.into(),
            prices: HashMap::new(),
        };
        assert_matches!(
            config.price_for(PlanTier::Launch, BillingCycle::Monthly),
            Err(StripeError::MissingPrice { plan: "launch", cycle: "monthly" })
        );
    }

    #[test]
    fn checkout_form_carries_user_id_and_plan_metadata() {
        let form = checkout_form(&request(), "price_123");
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let nil = "00000000-0000-0000-0000-000000000000";
        assert_eq!(get("mode"), Some("subscription"));
        assert_eq!(get("line_items[0][price]"), Some("price_123"));
        assert_eq!(get("client_reference_id"), Some(nil));
        assert_eq!(get("metadata[userId]"), Some(nil));
        assert_eq!(get("metadata[planType]"), Some("business"));
        assert_eq!(get("metadata[billingCycle]"), Some("annual"));
    }
}
