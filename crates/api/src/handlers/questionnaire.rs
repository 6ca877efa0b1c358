//! Handlers for the `/questionnaire` resource.
//!
//! The visible question sequence is recomputed from the catalog, the user's
//! plan and their stored answers on every request. Only the answers and the
//! resume index are persisted.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use webdash_core::error::CoreError;
use webdash_core::questionnaire::catalog::QUESTIONS;
use webdash_core::questionnaire::{
    merge_answers, step_index, validate_answer, validate_submission, visible_questions, Answers,
    Direction, Question, AUTOSAVE_DEBOUNCE_MS,
};
use webdash_db::models::reminder::CreateReminder;
use webdash_db::models::user::User;

use crate::background::site_generation;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequirePaid;
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_POSTPONE_HOURS: u32 = 24;
const MAX_POSTPONE_HOURS: u32 = 720;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveAnswersRequest {
    #[serde(default)]
    pub answers: Answers,
    pub current_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub answers: Answers,
    pub direction: Direction,
    pub current_index: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub answers: Answers,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostponeRequest {
    pub delay_hours: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QuestionnaireView {
    pub questions: Vec<&'static Question>,
    pub answers: Answers,
    pub current_index: usize,
    pub total: usize,
    pub completed: bool,
    pub autosave_debounce_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub completed: bool,
    pub site_generation_started: bool,
}

#[derive(Debug, Serialize)]
pub struct PostponeResponse {
    pub reminder_id: uuid::Uuid,
    pub due_at: chrono::DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/questionnaire
pub async fn get_questionnaire(RequirePaid(user): RequirePaid) -> AppResult<Json<ApiResponse<QuestionnaireView>>> {
    let answers = user.answers().clone();
    let index = stored_index(&user);
    Ok(ApiResponse::ok(view(&user, answers, index)))
}

/// PUT /api/v1/questionnaire/answers
///
/// Auto-save: merges without validation.
pub async fn save_answers(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    Json(input): Json<SaveAnswersRequest>,
) -> AppResult<Json<ApiResponse<QuestionnaireView>>> {
    ensure_open(&user)?;

    let mut answers = user.answers().clone();
    merge_answers(&mut answers, input.answers);
    let index = input.current_index.map(to_db_index);

    let saved = state
        .store
        .save_answers(user.id, answers, index)
        .await?
        .ok_or_else(|| user_not_found(&user))?;

    tracing::debug!(user_id = %user.id, "Questionnaire auto-saved");
    let index = stored_index(&saved);
    Ok(ApiResponse::ok(view(&saved, saved.answers().clone(), index)))
}

/// POST /api/v1/questionnaire/navigate
///
/// Moving forward validates the current question first. Moving back never
/// validates.
pub async fn navigate(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    Json(input): Json<NavigateRequest>,
) -> AppResult<Json<ApiResponse<QuestionnaireView>>> {
    ensure_open(&user)?;

    let plan = user.plan();
    let mut answers = user.answers().clone();
    merge_answers(&mut answers, input.answers);

    let visible = visible_questions(QUESTIONS, plan, &answers);
    let current = input.current_index.min(visible.len().saturating_sub(1));

    if input.direction == Direction::Next {
        if let Some(question) = visible.get(current) {
            validate_answer(question, answers.get(question.id), plan)?;
        }
    }

    let next = step_index(current, input.direction, visible.len());
    let saved = state
        .store
        .save_answers(user.id, answers, Some(to_db_index(next)))
        .await?
        .ok_or_else(|| user_not_found(&user))?;

    Ok(ApiResponse::ok(view(&saved, saved.answers().clone(), next)))
}

/// POST /api/v1/questionnaire/submit
///
/// Validates every visible question, marks the questionnaire complete, drops
/// pending reminders and starts site generation in the background.
pub async fn submit(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    body: Option<Json<SubmitRequest>>,
) -> AppResult<Json<ApiResponse<SubmitResponse>>> {
    ensure_open(&user)?;

    let plan = user.plan();
    let mut answers = user.answers().clone();
    if let Some(Json(input)) = body {
        merge_answers(&mut answers, input.answers);
    }

    let visible = visible_questions(QUESTIONS, plan, &answers);
    validate_submission(&visible, &answers, plan).map_err(CoreError::InvalidFields)?;

    let completed = state
        .store
        .complete_questionnaire(user.id, answers)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("Questionnaire already submitted".into()))
        })?;
    tracing::info!(user_id = %user.id, "Questionnaire submitted");

    match state.store.delete_pending_reminders(user.id).await {
        Ok(removed) if removed > 0 => {
            tracing::debug!(user_id = %user.id, removed, "Dropped pending reminders");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Failed to drop pending reminders"),
    }

    site_generation::spawn(state.clone(), completed);

    Ok(ApiResponse::ok(SubmitResponse {
        completed: true,
        site_generation_started: true,
    }))
}

/// POST /api/v1/questionnaire/postpone
///
/// Schedules a reminder email `delay_hours` from now (default 24).
pub async fn postpone(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    body: Option<Json<PostponeRequest>>,
) -> AppResult<Json<ApiResponse<PostponeResponse>>> {
    ensure_open(&user)?;

    let hours = body
        .and_then(|Json(b)| b.delay_hours)
        .unwrap_or(DEFAULT_POSTPONE_HOURS);
    if !(1..=MAX_POSTPONE_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "delay_hours must be between 1 and {MAX_POSTPONE_HOURS}"
        )));
    }

    let reminder = state
        .store
        .create_reminder(CreateReminder {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            due_at: Utc::now() + Duration::hours(i64::from(hours)),
        })
        .await?;
    tracing::info!(user_id = %user.id, due_at = %reminder.due_at, "Questionnaire reminder scheduled");

    Ok(ApiResponse::ok(PostponeResponse {
        reminder_id: reminder.id,
        due_at: reminder.due_at,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mutations are refused once the questionnaire has been submitted.
pub(crate) fn ensure_open(user: &User) -> AppResult<()> {
    if user.completed_questionnaire {
        return Err(AppError::Core(CoreError::Forbidden(
            "Questionnaire already submitted".into(),
        )));
    }
    Ok(())
}

pub(crate) fn user_not_found(user: &User) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "User",
        id: user.id.to_string(),
    })
}

fn stored_index(user: &User) -> usize {
    usize::try_from(user.current_question_index).unwrap_or(0)
}

fn to_db_index(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

fn view(user: &User, answers: Answers, index: usize) -> QuestionnaireView {
    let questions = visible_questions(QUESTIONS, user.plan(), &answers);
    let total = questions.len();
    QuestionnaireView {
        current_index: index.min(total.saturating_sub(1)),
        questions,
        answers,
        total,
        completed: user.completed_questionnaire,
        autosave_debounce_ms: AUTOSAVE_DEBOUNCE_MS,
    }
}
