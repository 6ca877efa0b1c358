//! Questionnaire file uploads.
//!
//! Every limit (per-file size, aggregate size, MIME allowlist) is checked
//! before anything is written to object storage. Multi-file fields store
//! files one at a time, skipping the ones that fail, and only report an
//! error when none made it.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use webdash_core::error::{CoreError, FieldError};
use webdash_core::questionnaire::answers::FileRef;
use webdash_core::questionnaire::{find_question, is_visible, QuestionKind};
use webdash_core::uploads::{sanitize_file_name, validate_file, validate_total};

use super::questionnaire::{ensure_open, user_not_found};
use crate::active_uploads::UploadGuard;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequirePaid;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Multipart field names that carry files.
const FILE_FIELDS: &[&str] = &["file", "files"];

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub question_id: String,
    pub files: Vec<FileRef>,
    pub skipped: Vec<SkippedFile>,
}

/// A file left out of a multi-file upload, with the reason.
#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

struct IncomingFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// POST /api/v1/questionnaire/uploads/{question_id}
pub async fn upload(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
    Path(question_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    ensure_open(&user)?;

    let question = find_question(&question_id).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Question",
            id: question_id.clone(),
        })
    })?;
    if !question.kind.is_upload() {
        return Err(FieldError::new(question.id, "This question does not accept files").into());
    }
    if !is_visible(question, user.plan(), user.answers()) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Question {} is not available for this account",
            question.id
        ))));
    }

    let guard = state.active_uploads.begin(user.id);

    let mut incoming = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if !field.name().is_some_and(|n| FILE_FIELDS.contains(&n)) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
        incoming.push(IncomingFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    if incoming.is_empty() {
        return Err(FieldError::new(question.id, "Select a file to upload").into());
    }

    let (files, skipped) = match question.kind {
        QuestionKind::File => {
            if incoming.len() > 1 {
                return Err(
                    FieldError::new(question.id, "Only one file can be uploaded here").into(),
                );
            }
            let file = &incoming[0];
            validate_file(&file.name, &file.mime_type, file.bytes.len() as u64)
                .map_err(|e| e.for_field(question.id))?;
            let stored = store_files(&state, &guard, user.id, question.id, &incoming).await?;
            (stored, Vec::new())
        }
        _ => {
            let sizes: Vec<u64> = incoming.iter().map(|f| f.bytes.len() as u64).collect();
            validate_total(&sizes).map_err(|e| e.for_field(question.id))?;

            let mut skipped = Vec::new();
            let mut accepted = Vec::new();
            for file in incoming {
                match validate_file(&file.name, &file.mime_type, file.bytes.len() as u64) {
                    Ok(()) => accepted.push(file),
                    Err(e) => {
                        tracing::info!(user_id = %user.id, file = %file.name, error = %e, "Skipping invalid upload");
                        skipped.push(SkippedFile {
                            name: file.name.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            if accepted.is_empty() {
                let message = skipped
                    .first()
                    .map(|s| s.message.clone())
                    .unwrap_or_else(|| "No files could be uploaded".to_string());
                return Err(FieldError::new(question.id, message).into());
            }
            let stored = store_files(&state, &guard, user.id, question.id, &accepted).await?;
            (stored, skipped)
        }
    };

    // Re-read so answers auto-saved during the upload are not overwritten.
    let latest = state
        .store
        .find_user(user.id)
        .await?
        .ok_or_else(|| user_not_found(&user))?;
    let mut answers = latest.answers().clone();
    let value = match question.kind {
        QuestionKind::File => serde_json::to_value(&files[0]),
        _ => {
            let mut all: Vec<Value> = answers
                .get(question.id)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for file in &files {
                all.push(serde_json::to_value(file).map_err(|e| AppError::InternalError(e.to_string()))?);
            }
            Ok(Value::Array(all))
        }
    }
    .map_err(|e| AppError::InternalError(format!("Failed to encode file reference: {e}")))?;
    answers.insert(question.id.to_string(), value);
    state.store.save_answers(user.id, answers, None).await?;

    tracing::info!(
        user_id = %user.id,
        question_id = question.id,
        stored = files.len(),
        skipped = skipped.len(),
        "Upload complete"
    );
    Ok(ApiResponse::ok(UploadResponse {
        question_id: question.id.to_string(),
        files,
        skipped,
    }))
}

/// DELETE /api/v1/questionnaire/uploads/active
pub async fn cancel_active(
    State(state): State<AppState>,
    RequirePaid(user): RequirePaid,
) -> AppResult<Json<ApiResponse<CancelResponse>>> {
    let cancelled = state.active_uploads.cancel(user.id);
    Ok(ApiResponse::ok(CancelResponse { cancelled }))
}

/// Store files in order. Storage failures are logged and skipped; the call
/// fails only when nothing was stored. A cancelled upload removes what it
/// already wrote.
async fn store_files(
    state: &AppState,
    guard: &UploadGuard,
    user_id: uuid::Uuid,
    question_id: &str,
    files: &[IncomingFile],
) -> AppResult<Vec<FileRef>> {
    let mut stored: Vec<(String, FileRef)> = Vec::new();
    let mut last_error = None;

    for file in files {
        if guard.is_cancelled() {
            for (key, _) in &stored {
                if let Err(e) = state.object_store.delete(key).await {
                    tracing::warn!(key = %key, error = %e, "Failed to remove file from cancelled upload");
                }
            }
            tracing::info!(user_id = %user_id, question_id, "Upload cancelled");
            return Err(AppError::BadRequest("Upload was cancelled".into()));
        }

        let key = format!(
            "{user_id}/{question_id}/{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(&file.name)
        );
        match state
            .object_store
            .put(&key, &file.bytes, &file.mime_type)
            .await
        {
            Ok(url) => stored.push((
                key,
                FileRef {
                    name: file.name.clone(),
                    url,
                    mime_type: file.mime_type.clone(),
                    size: file.bytes.len() as u64,
                },
            )),
            Err(e) => {
                tracing::warn!(user_id = %user_id, file = %file.name, error = %e, "Failed to store upload");
                last_error = Some(e);
            }
        }
    }

    if stored.is_empty() {
        let detail = last_error.map(|e| e.to_string()).unwrap_or_default();
        return Err(AppError::InternalError(format!("No files could be stored: {detail}")));
    }
    Ok(stored.into_iter().map(|(_, file)| file).collect())
}
