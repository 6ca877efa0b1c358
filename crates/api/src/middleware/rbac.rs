//! Role and account-state extractors built on [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use webdash_core::error::CoreError;
use webdash_core::roles::ROLE_ADMIN;
use webdash_db::models::user::User;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// The authenticated user's current record.
///
/// A valid token for a deleted account is rejected as unauthenticated.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = state.store.find_user(auth.user_id).await?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;
        Ok(CurrentUser(user))
    }
}

/// A user who has paid. Rejects unpaid accounts with 403.
pub struct RequirePaid(pub User);

impl FromRequestParts<AppState> for RequirePaid {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.has_paid {
            return Err(AppError::Core(CoreError::Forbidden(
                "An active plan is required".into(),
            )));
        }
        Ok(RequirePaid(user))
    }
}
