//! Customer dashboard: project progress and feedback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use webdash_core::error::FieldError;
use webdash_core::plans::{BillingCycle, PlanTier, SubscriptionStatus};
use webdash_db::models::user::{FeedbackEntry, ProjectPhase, User};

use super::questionnaire::user_not_found;
use crate::error::AppResult;
use crate::middleware::rbac::RequirePaid;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Longest feedback message accepted, in characters.
const MAX_FEEDBACK_CHARS: usize = 5000;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub name: String,
    pub plan: Option<PlanTier>,
    pub billing_cycle: Option<BillingCycle>,
    pub subscription_status: SubscriptionStatus,
    pub completed_questionnaire: bool,
    pub project_phases: Vec<ProjectPhase>,
    pub website_url: Option<String>,
    pub editor_url: Option<String>,
    pub revision_url: Option<String>,
    pub feedback: Vec<FeedbackEntry>,
}

impl From<&User> for DashboardView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            plan: user.plan(),
            billing_cycle: user.cycle(),
            subscription_status: user.status(),
            completed_questionnaire: user.completed_questionnaire,
            project_phases: user.project_phases.0.clone(),
            website_url: user.website_url.clone(),
            editor_url: user.editor_url.clone(),
            revision_url: user.revision_url.clone(),
            feedback: user.feedback.0.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub message: String,
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(RequirePaid(user): RequirePaid) -> AppResult<Json<ApiResponse<DashboardView>>> {
    Ok(ApiResponse::ok(DashboardView::from(&user)))
}

/// POST /api/v1/dashboard/feedback
pub async fn post_feedback(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    Json(input): Json<FeedbackRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FeedbackEntry>>)> {
    let message = input.message.trim();
    if message.is_empty() {
        return Err(FieldError::new("message", "Feedback cannot be empty").into());
    }
    if message.chars().count() > MAX_FEEDBACK_CHARS {
        return Err(FieldError::new(
            "message",
            format!("Feedback must be at most {MAX_FEEDBACK_CHARS} characters"),
        )
        .into());
    }

    let entry = FeedbackEntry {
        message: message.to_string(),
        created_at: Utc::now(),
    };
    state
        .store
        .append_feedback(user.id, entry.clone())
        .await?
        .ok_or_else(|| user_not_found(&user))?;

    tracing::info!(user_id = %user.id, "Feedback received");
    Ok((StatusCode::CREATED, ApiResponse::ok(entry)))
}
