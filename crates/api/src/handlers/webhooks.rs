//! Stripe webhook reconciliation.
//!
//! Responses here are the bare `{received}` / `{error}` bodies Stripe's
//! dashboard displays, not the API envelope. Any 2xx stops Stripe from
//! retrying, so only verification, parse and storage failures return an
//! error status.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use webdash_core::billing::{
    self, checkout_details, intended_status, subscription_details, summarize_unverified, EventKind,
    WebhookEvent,
};
use webdash_core::plans::SubscriptionStatus;
use webdash_core::verification::normalize_email;
use webdash_db::models::user::{UpdateBilling, User};
use webdash_db::StoreError;

use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/v1/webhooks/stripe
pub async fn stripe(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if let Err(e) = billing::verify_signature(
        &body,
        signature,
        &state.config.stripe_webhook_secret,
        Utc::now().timestamp(),
    ) {
        let (event_type, event_id) = summarize_unverified(&body);
        tracing::warn!(
            error = %e,
            event_type = event_type.as_deref().unwrap_or("unknown"),
            event_id = event_id.as_deref().unwrap_or("unknown"),
            "Rejected webhook with invalid signature"
        );
        return reject(StatusCode::BAD_REQUEST, format!("Webhook signature verification failed: {e}"));
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook payload is not a Stripe event");
            return reject(StatusCode::BAD_REQUEST, "Invalid event payload".to_string());
        }
    };

    let kind = EventKind::from_type(&event.event_type);
    let outcome = match kind {
        EventKind::CheckoutCompleted => checkout_completed(&state, &event).await,
        k if k.is_subscription_lifecycle() => subscription_changed(&state, &event, k).await,
        _ => {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
            Ok(())
        }
    };

    match outcome {
        Ok(()) => (StatusCode::OK, Json(json!({ "received": true }))).into_response(),
        Err(e) => {
            tracing::error!(event_id = %event.id, event_type = %event.event_type, error = %e, "Webhook processing failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Webhook processing failed".to_string())
        }
    }
}

fn reject(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn checkout_completed(state: &AppState, event: &WebhookEvent) -> Result<(), StoreError> {
    let details = checkout_details(&event.data.object);

    let mut user = match details.user_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => state.store.find_user(id).await?,
        Some(Err(_)) => {
            tracing::warn!(event_id = %event.id, "Checkout carries a malformed user id");
            None
        }
        None => None,
    };
    if user.is_none() {
        user = resolve_user(state, details.customer_id.as_deref(), details.email.as_deref()).await?;
    }
    let Some(user) = user else {
        tracing::warn!(
            event_id = %event.id,
            customer_id = details.customer_id.as_deref().unwrap_or("none"),
            "Completed checkout matches no user"
        );
        return Ok(());
    };

    state
        .store
        .update_billing(
            user.id,
            UpdateBilling {
                plan_type: details.plan.map(|p| p.as_str().to_string()),
                billing_cycle: details.billing_cycle.map(|c| c.as_str().to_string()),
                has_paid: Some(true),
                subscription_status: Some(SubscriptionStatus::Active.as_str().to_string()),
                stripe_customer_id: details.customer_id,
                stripe_subscription_id: details.subscription_id,
            },
        )
        .await?;

    tracing::info!(event_id = %event.id, user_id = %user.id, "Checkout completed");
    Ok(())
}

async fn subscription_changed(
    state: &AppState,
    event: &WebhookEvent,
    kind: EventKind,
) -> Result<(), StoreError> {
    let subscription = &event.data.object;
    let details = subscription_details(subscription);
    let status = intended_status(kind, subscription);

    let Some(customer_id) = details.customer_id.as_deref() else {
        tracing::warn!(event_id = %event.id, "Subscription event has no customer");
        return Ok(());
    };

    let mut linked_by_fallback = false;
    let mut user = state.store.find_user_by_customer_id(customer_id).await?;
    if user.is_none() {
        let email = match state.payments.customer_email(customer_id).await {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(event_id = %event.id, customer_id, error = %e, "Customer lookup failed");
                None
            }
        };
        user = resolve_by_email(state, email.as_deref()).await?;
        linked_by_fallback = user.is_some();
    }
    let Some(user) = user else {
        tracing::warn!(event_id = %event.id, customer_id, "Subscription event matches no user");
        return Ok(());
    };

    state
        .store
        .update_billing(
            user.id,
            UpdateBilling {
                has_paid: (status == SubscriptionStatus::Active).then_some(true),
                subscription_status: Some(status.as_str().to_string()),
                stripe_customer_id: linked_by_fallback.then(|| customer_id.to_string()),
                stripe_subscription_id: details.subscription_id,
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(
        event_id = %event.id,
        user_id = %user.id,
        status = status.as_str(),
        linked_by_fallback,
        "Subscription updated"
    );
    Ok(())
}

/// Resolve by stored customer id, then by email.
async fn resolve_user(
    state: &AppState,
    customer_id: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>, StoreError> {
    if let Some(customer_id) = customer_id {
        if let Some(user) = state.store.find_user_by_customer_id(customer_id).await? {
            return Ok(Some(user));
        }
    }
    resolve_by_email(state, email).await
}

/// Match an email to an account.
///
/// Emails are stored normalized and unique, so the indexed lookup also finds
/// earlier direct-payment accounts (paid, never linked to a customer); no
/// scan over all users is needed.
async fn resolve_by_email(state: &AppState, email: Option<&str>) -> Result<Option<User>, StoreError> {
    let Some(email) = email.map(normalize_email).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    state.store.find_user_by_email(&email).await
}
