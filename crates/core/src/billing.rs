//! Stripe webhook events: signature verification, event classification and
//! the subscription status each event implies.
//!
//! Nothing here touches the user store; the API layer resolves the user and
//! applies the resulting status.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::plans::{BillingCycle, PlanTier, SubscriptionStatus};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Query parameter (and metadata key) that carries our user id through checkout.
pub const USER_ID_PARAM: &str = "userId";

/// Stripe statuses that mean the subscription is over.
const CANCELED_STATUSES: &[&str] = &["canceled", "unpaid", "incomplete_expired"];

// ---------------------------------------------------------------------------
// Signature verification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,

    #[error("signature header has no v1 signature")]
    MissingSignature,

    #[error("signature timestamp is {age_secs}s old")]
    Stale { age_secs: i64 },

    #[error("no signature matches the payload")]
    Mismatch,

    #[error("webhook secret is not configured")]
    InvalidSecret,
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`).
///
/// The signed message is `"{t}.{payload}"`, HMAC-SHA256 keyed with the
/// endpoint secret. Any one matching `v1` entry is enough. An empty secret
/// rejects every event.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.trim().is_empty() {
        return Err(SignatureError::InvalidSecret);
    }

    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    let issued: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    let age_secs = (now - issued).abs();
    if age_secs > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Stale { age_secs });
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Build a `Stripe-Signature` header value for `payload`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The parts of a Stripe event envelope we read.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CheckoutCompleted,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => Self::CheckoutCompleted,
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            _ => Self::Other,
        }
    }

    pub fn is_subscription_lifecycle(self) -> bool {
        matches!(
            self,
            Self::SubscriptionCreated | Self::SubscriptionUpdated | Self::SubscriptionDeleted
        )
    }
}

/// Best-effort `(type, id)` of a payload that failed verification, for logs only.
pub fn summarize_unverified(payload: &[u8]) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_slice::<Value>(payload) else {
        return (None, None);
    };
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    (field("type"), field("id"))
}

// ---------------------------------------------------------------------------
// Subscription lifecycle
// ---------------------------------------------------------------------------

/// Status a subscription lifecycle event should leave the user in.
///
/// Deletion always cancels. Otherwise a scheduled `cancel_at` or a terminal
/// Stripe status cancels, and anything else counts as active.
pub fn intended_status(kind: EventKind, subscription: &Value) -> SubscriptionStatus {
    if kind == EventKind::SubscriptionDeleted {
        return SubscriptionStatus::Canceled;
    }
    let cancel_scheduled = subscription
        .get("cancel_at")
        .is_some_and(|v| !v.is_null());
    let terminal = subscription
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| CANCELED_STATUSES.contains(&s));
    if cancel_scheduled || terminal {
        SubscriptionStatus::Canceled
    } else {
        SubscriptionStatus::Active
    }
}

/// Fields read from a subscription object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDetails {
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
}

pub fn subscription_details(subscription: &Value) -> SubscriptionDetails {
    SubscriptionDetails {
        subscription_id: string_field(subscription, "id"),
        customer_id: expandable_id(subscription, "customer"),
    }
}

// ---------------------------------------------------------------------------
// Checkout completion
// ---------------------------------------------------------------------------

/// Fields read from a completed checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub email: Option<String>,
    pub plan: Option<PlanTier>,
    pub billing_cycle: Option<BillingCycle>,
}

/// Extract what we need from a `checkout.session.completed` object.
///
/// The user id is looked up in the success URL's query string first, then in
/// session metadata, then in `client_reference_id`.
pub fn checkout_details(session: &Value) -> CheckoutDetails {
    let metadata = session.get("metadata");
    let meta = |key: &str| {
        metadata
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let user_id = session
        .get("success_url")
        .and_then(Value::as_str)
        .and_then(|url| query_param(url, USER_ID_PARAM))
        .or_else(|| meta(USER_ID_PARAM))
        .or_else(|| string_field(session, "client_reference_id"));

    let email = session
        .get("customer_details")
        .and_then(|d| d.get("email"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| string_field(session, "customer_email"));

    CheckoutDetails {
        user_id,
        customer_id: expandable_id(session, "customer"),
        subscription_id: expandable_id(session, "subscription"),
        email,
        plan: meta("planType").and_then(|p| PlanTier::from_str_db(&p).ok()),
        billing_cycle: meta("billingCycle").and_then(|c| BillingCycle::from_str_db(&c).ok()),
    }
}

/// Read a non-empty query parameter from a URL without decoding it.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn string_field(object: &Value, name: &str) -> Option<String> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Stripe fields like `customer` are either an id string or an expanded object.
fn expandable_id(object: &Value, name: &str) -> Option<String> {
    match object.get(name)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(expanded) => expanded
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
