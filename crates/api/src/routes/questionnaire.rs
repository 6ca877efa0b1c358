//! Route definitions for the `/questionnaire` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use webdash_core::uploads::MAX_UPLOAD_REQUEST_BYTES;

use crate::handlers::{questionnaire, uploads};
use crate::state::AppState;

/// Routes mounted at `/questionnaire`.
///
/// ```text
/// GET    /                        -> get_questionnaire
/// PUT    /answers                 -> save_answers
/// POST   /navigate                -> navigate
/// POST   /submit                  -> submit
/// POST   /postpone                -> postpone
/// POST   /uploads/{question_id}   -> upload
/// DELETE /uploads/active          -> cancel_active
/// ```
///
/// The upload route raises the default body limit so oversized files reach
/// the per-file checks and get a field-level error.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(questionnaire::get_questionnaire))
        .route("/answers", put(questionnaire::save_answers))
        .route("/navigate", post(questionnaire::navigate))
        .route("/submit", post(questionnaire::submit))
        .route("/postpone", post(questionnaire::postpone))
        .route("/uploads/active", delete(uploads::cancel_active))
        .route(
            "/uploads/{question_id}",
            post(uploads::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_REQUEST_BYTES)),
        )
}
