//! Handlers for the signed-in user's own account.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use webdash_db::models::user::UserResponse;

use super::questionnaire::user_not_found;
use crate::error::AppResult;
use crate::middleware::rbac::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/account
pub async fn get_account(CurrentUser(user): CurrentUser) -> AppResult<Json<ApiResponse<UserResponse>>> {
    Ok(ApiResponse::ok(UserResponse::from(&user)))
}

/// DELETE /api/v1/account
///
/// Removes the user together with any pending reminders and stops an
/// in-flight upload.
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<StatusCode> {
    state.active_uploads.cancel(user.id);
    let dropped = state.store.delete_pending_reminders(user.id).await?;
    if !state.store.delete_user(user.id).await? {
        return Err(user_not_found(&user));
    }
    tracing::info!(user_id = %user.id, reminders_dropped = dropped, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
