//! Storage abstraction used by the API layer.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;
use webdash_core::questionnaire::Answers;
use webdash_core::types::{Timestamp, UserId};

use crate::models::reminder::{CreateReminder, Reminder};
use crate::models::user::{CreateUser, FeedbackEntry, UpdateBilling, UpdateProject, User};
use crate::models::verification_code::VerificationCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Persistence operations for users, verification codes and reminders.
///
/// Update methods return `Ok(None)` when the target row does not exist.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn create_user(&self, input: CreateUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_customer_id(&self, customer_id: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn update_billing(&self, id: UserId, input: UpdateBilling) -> Result<Option<User>, StoreError>;
    async fn update_project(&self, id: UserId, input: UpdateProject) -> Result<Option<User>, StoreError>;
    async fn save_answers(
        &self,
        id: UserId,
        answers: Answers,
        current_index: Option<i32>,
    ) -> Result<Option<User>, StoreError>;
    /// Returns `Ok(None)` when the user is missing or already submitted.
    async fn complete_questionnaire(&self, id: UserId, answers: Answers) -> Result<Option<User>, StoreError>;
    async fn append_feedback(&self, id: UserId, entry: FeedbackEntry) -> Result<Option<User>, StoreError>;

    async fn upsert_verification_code(&self, code: VerificationCode) -> Result<(), StoreError>;
    async fn find_verification_code(&self, key: &str) -> Result<Option<VerificationCode>, StoreError>;
    async fn delete_verification_code(&self, key: &str) -> Result<bool, StoreError>;

    async fn create_reminder(&self, input: CreateReminder) -> Result<Reminder, StoreError>;
    async fn list_due_reminders(&self, now: Timestamp) -> Result<Vec<Reminder>, StoreError>;
    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        provider_message_id: Option<String>,
        sent_at: Timestamp,
    ) -> Result<(), StoreError>;
    async fn mark_reminder_failed(&self, id: Uuid, error: String) -> Result<(), StoreError>;
    async fn delete_pending_reminders(&self, user_id: UserId) -> Result<u64, StoreError>;
}
