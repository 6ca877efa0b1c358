use axum::routing::get;
use axum::Router;

use crate::handlers::domains;
use crate::state::AppState;

/// Routes mounted at `/domains`.
///
/// ```text
/// GET /search?query=   -> search
/// GET /status?domain=  -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(domains::search))
        .route("/status", get(domains::status))
}
