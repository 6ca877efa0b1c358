use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`. Paid accounts only.
///
/// ```text
/// GET  /          -> get_dashboard
/// POST /feedback  -> post_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::get_dashboard))
        .route("/feedback", post(dashboard::post_feedback))
}
