use axum::routing::post;
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing`.
///
/// ```text
/// POST /checkout  -> checkout
/// POST /cancel    -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(billing::checkout))
        .route("/cancel", post(billing::cancel))
}
