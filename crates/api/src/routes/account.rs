use axum::routing::get;
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/account`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(account::get_account).delete(account::delete_account))
}
