pub mod account;
pub mod admin;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod domains;
pub mod health;
pub mod questionnaire;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     sign up (public)
/// /auth/login                                      login (public)
/// /auth/verification/send                          email a code (public, rate limited)
/// /auth/verification/verify                        check a code (public)
///
/// /account                                         get, delete (auth required)
///
/// /questionnaire                                   visible questions + progress (GET, paid users)
/// /questionnaire/answers                           auto-save (PUT)
/// /questionnaire/navigate                          validated step (POST)
/// /questionnaire/submit                            final submission (POST)
/// /questionnaire/postpone                          schedule a reminder (POST)
/// /questionnaire/uploads/{question_id}             upload files (POST, multipart)
/// /questionnaire/uploads/active                    cancel in-flight upload (DELETE)
///
/// /billing/checkout                                start a Stripe checkout (POST)
/// /billing/cancel                                  cancel at period end (POST)
///
/// /webhooks/stripe                                 Stripe events (signature checked)
///
/// /dashboard                                       project view (paid users)
/// /dashboard/feedback                              leave feedback (POST, paid users)
///
/// /domains/search                                  affordable suggestions (GET)
/// /domains/status                                  single name check (GET)
///
/// /admin/users                                     list (admin only)
/// /admin/users/{id}/project                        update phases and links (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/questionnaire", questionnaire::router())
        .nest("/billing", billing::router())
        .nest("/webhooks", webhooks::router())
        .nest("/dashboard", dashboard::router())
        .nest("/domains", domains::router())
        .nest("/admin", admin::router())
}
