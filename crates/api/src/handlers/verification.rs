//! Email verification codes: issue and check.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;
use webdash_core::error::{CoreError, FieldError};
use webdash_core::verification::{self, CodeCheck};
use webdash_db::models::verification_code::VerificationCode;
use webdash_services::email::verification_email;

use crate::error::{AppError, AppResult};
use crate::middleware::client_ip::ClientIp;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub sent: bool,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

/// POST /api/v1/auth/verification/send
///
/// Rate limited per client IP. A new code replaces any earlier one for the
/// same email.
pub async fn send_code(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(input): Json<SendCodeRequest>,
) -> AppResult<Json<ApiResponse<SendCodeResponse>>> {
    if !state.verification_limiter.check(&ip).await {
        return Err(AppError::Core(CoreError::RateLimited(format!(
            "Verification code requests from {ip}"
        ))));
    }

    let email = verification::normalize_email(&input.email);
    if !email.validate_email() {
        return Err(FieldError::new("email", "Enter a valid email address").into());
    }

    let now = Utc::now();
    let code = verification::generate_code();
    state
        .store
        .upsert_verification_code(VerificationCode {
            key: verification::storage_key(&email, &state.config.verification_salt),
            email: email.clone(),
            code: code.clone(),
            created_at: now,
            expires_at: verification::expires_at(now),
        })
        .await?;

    let sent = state
        .mailer
        .send(&verification_email(&email, &code))
        .await
        .map_err(|e| AppError::InternalError(format!("Verification email failed: {e}")))?;
    tracing::info!(message_id = ?sent.message_id, "Verification code sent");

    Ok(ApiResponse::ok(SendCodeResponse {
        sent: true,
        expires_in_minutes: verification::CODE_TTL_MINUTES,
    }))
}

/// POST /api/v1/auth/verification/verify
///
/// A valid code is consumed. An expired code is removed. A wrong code leaves
/// the record in place so the user can retry.
pub async fn verify_code(
    State(state): State<AppState>,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<ApiResponse<VerifyCodeResponse>>> {
    let key = verification::storage_key(&input.email, &state.config.verification_salt);
    let Some(stored) = state.store.find_verification_code(&key).await? else {
        return Ok(ApiResponse::ok(VerifyCodeResponse { verified: false }));
    };

    let outcome = verification::check_code(
        &stored.email,
        &stored.code,
        stored.expires_at,
        &input.email,
        &input.code,
        Utc::now(),
    );
    let verified = match outcome {
        CodeCheck::Valid => {
            state.store.delete_verification_code(&key).await?;
            true
        }
        CodeCheck::Expired => {
            state.store.delete_verification_code(&key).await?;
            tracing::info!("Verification code expired");
            false
        }
        CodeCheck::Mismatch => false,
    };

    Ok(ApiResponse::ok(VerifyCodeResponse { verified }))
}
