//! Agency staff operations. Every handler requires the `admin` role.

use axum::extract::{Path, State};
use axum::Json;
use webdash_core::error::CoreError;
use webdash_core::types::UserId;
use webdash_db::models::user::{UpdateProject, UserResponse};

use super::dashboard::DashboardView;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.store.list_users().await?;
    Ok(ApiResponse::ok(users.iter().map(UserResponse::from).collect()))
}

/// PUT /api/v1/admin/users/{id}/project
///
/// Updates phases and site links. Returns the customer's dashboard view.
pub async fn update_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<ApiResponse<DashboardView>>> {
    let user = state
        .store
        .update_project(id, input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: id.to_string(),
            })
        })?;

    tracing::info!(admin_id = %admin.user_id, user_id = %id, "Project updated");
    Ok(ApiResponse::ok(DashboardView::from(&user)))
}
