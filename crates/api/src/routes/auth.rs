//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::{auth, verification};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup               -> signup
/// POST /login                -> login
/// POST /verification/send    -> send_code
/// POST /verification/verify  -> verify_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/verification/send", post(verification::send_code))
        .route("/verification/verify", post(verification::verify_code))
}
