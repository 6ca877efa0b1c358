//! Handlers for the `/auth` resource (sign-up, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;
use webdash_core::error::{CoreError, FieldError};
use webdash_core::roles::ROLE_USER;
use webdash_core::verification::normalize_email;
use webdash_db::models::user::{CreateUser, User, UserResponse};
use webdash_db::StoreError;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let email = normalize_email(&input.email);
    let mut fields = Vec::new();
    if !email.validate_email() {
        fields.push(FieldError::new("email", "Enter a valid email address"));
    }
    if let Err(msg) = validate_password_strength(&input.password) {
        fields.push(FieldError::new("password", msg));
    }
    if input.name.trim().is_empty() {
        fields.push(FieldError::new("name", "Name is required"));
    }
    if !fields.is_empty() {
        return Err(AppError::Core(CoreError::InvalidFields(fields)));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .store
        .create_user(CreateUser {
            email,
            password_hash,
            name: input.name.trim().to_string(),
            phone: input
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            role: ROLE_USER.to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::from(FieldError::new(
                "email",
                "An account with this email already exists",
            )),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "User signed up");
    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = state
        .store
        .find_user_by_email(&normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    Ok(ApiResponse::ok(auth_response(&state, &user)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in_secs(),
        user: UserResponse::from(user),
    })
}
