use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`. Authenticated by signature, not by token.
pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(webhooks::stripe))
}
