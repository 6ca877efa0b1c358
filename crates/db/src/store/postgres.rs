//! [`DocumentStore`] backed by Postgres through the repository layer.

use async_trait::async_trait;
use uuid::Uuid;
use webdash_core::questionnaire::Answers;
use webdash_core::types::{Timestamp, UserId};

use super::{DocumentStore, StoreError};
use crate::models::reminder::{CreateReminder, Reminder};
use crate::models::user::{CreateUser, FeedbackEntry, UpdateBilling, UpdateProject, User};
use crate::models::verification_code::VerificationCode;
use crate::repositories::{ReminderRepo, UserRepo, VerificationCodeRepo};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map unique-violation errors (SQLSTATE 23505) to [`StoreError::Conflict`].
fn map_unique(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
            return StoreError::Conflict(constraint);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, &input).await.map_err(map_unique)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_customer_id(&self, customer_id: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_customer_id(&self.pool, customer_id).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(UserRepo::delete(&self.pool, id).await?)
    }

    async fn update_billing(&self, id: UserId, input: UpdateBilling) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::update_billing(&self.pool, id, &input).await?)
    }

    async fn update_project(&self, id: UserId, input: UpdateProject) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::update_project(&self.pool, id, &input).await?)
    }

    async fn save_answers(
        &self,
        id: UserId,
        answers: Answers,
        current_index: Option<i32>,
    ) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::save_answers(&self.pool, id, &answers, current_index).await?)
    }

    async fn complete_questionnaire(&self, id: UserId, answers: Answers) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::complete_questionnaire(&self.pool, id, &answers).await?)
    }

    async fn append_feedback(&self, id: UserId, entry: FeedbackEntry) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::append_feedback(&self.pool, id, &entry).await?)
    }

    async fn upsert_verification_code(&self, code: VerificationCode) -> Result<(), StoreError> {
        Ok(VerificationCodeRepo::upsert(&self.pool, &code).await?)
    }

    async fn find_verification_code(&self, key: &str) -> Result<Option<VerificationCode>, StoreError> {
        Ok(VerificationCodeRepo::find(&self.pool, key).await?)
    }

    async fn delete_verification_code(&self, key: &str) -> Result<bool, StoreError> {
        Ok(VerificationCodeRepo::delete(&self.pool, key).await?)
    }

    async fn create_reminder(&self, input: CreateReminder) -> Result<Reminder, StoreError> {
        Ok(ReminderRepo::create(&self.pool, &input).await?)
    }

    async fn list_due_reminders(&self, now: Timestamp) -> Result<Vec<Reminder>, StoreError> {
        Ok(ReminderRepo::list_due(&self.pool, now).await?)
    }

    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        provider_message_id: Option<String>,
        sent_at: Timestamp,
    ) -> Result<(), StoreError> {
        Ok(ReminderRepo::mark_sent(&self.pool, id, provider_message_id.as_deref(), sent_at).await?)
    }

    async fn mark_reminder_failed(&self, id: Uuid, error: String) -> Result<(), StoreError> {
        Ok(ReminderRepo::mark_failed(&self.pool, id, &error).await?)
    }

    async fn delete_pending_reminders(&self, user_id: UserId) -> Result<u64, StoreError> {
        Ok(ReminderRepo::delete_pending_for_user(&self.pool, user_id).await?)
    }
}
