//! Subscription checkout and cancellation.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use webdash_core::billing::USER_ID_PARAM;
use webdash_core::error::CoreError;
use webdash_core::plans::{BillingCycle, PlanTier, SubscriptionStatus};
use webdash_db::models::user::UpdateBilling;
use webdash_services::stripe::{CheckoutRequest, StripeError};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Placeholder Stripe replaces with the session id on redirect.
const SESSION_ID_TEMPLATE: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub plan: PlanTier,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub subscription_status: SubscriptionStatus,
}

/// POST /api/v1/billing/checkout
///
/// The success URL carries the user id so the completion webhook can find
/// the account even before a Stripe customer is linked. The chosen plan
/// travels in session metadata and is only stored once that webhook
/// confirms payment.
pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CheckoutInput>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let request = CheckoutRequest {
        user_id: user.id,
        email: user.email.clone(),
        plan: input.plan,
        cycle: input.billing_cycle,
        success_url: state.config.app_url(&format!(
            "/payment/success?{USER_ID_PARAM}={}&session_id={SESSION_ID_TEMPLATE}",
            user.id
        )),
        cancel_url: state.config.app_url("/pricing"),
    };
    let session = state
        .payments
        .create_checkout_session(&request)
        .await
        .map_err(stripe_error)?;

    tracing::info!(
        user_id = %user.id,
        session_id = %session.id,
        plan = input.plan.as_str(),
        cycle = input.billing_cycle.as_str(),
        "Checkout session created"
    );
    Ok(ApiResponse::ok(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// POST /api/v1/billing/cancel
///
/// Cancels at the end of the paid period. Access stays until Stripe sends the
/// deletion event.
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ApiResponse<CancelResponse>>> {
    let subscription_id = user.stripe_subscription_id.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Validation("No active subscription to cancel".into()))
    })?;

    state
        .payments
        .cancel_subscription(subscription_id)
        .await
        .map_err(stripe_error)?;

    let status = SubscriptionStatus::Canceled;
    if let Err(e) = state
        .store
        .update_billing(
            user.id,
            UpdateBilling {
                subscription_status: Some(status.as_str().to_string()),
                ..Default::default()
            },
        )
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to record cancellation locally");
    }

    tracing::info!(user_id = %user.id, subscription_id, "Subscription set to cancel");
    Ok(ApiResponse::ok(CancelResponse {
        subscription_status: status,
    }))
}

fn stripe_error(err: StripeError) -> AppError {
    match err {
        StripeError::MissingPrice { .. } => {
            AppError::Core(CoreError::Validation("This plan is not available for purchase".into()))
        }
        other => AppError::InternalError(format!("Stripe: {other}")),
    }
}
