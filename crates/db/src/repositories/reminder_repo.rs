//! Repository for the `reminders` table.

use sqlx::PgPool;
use uuid::Uuid;
use webdash_core::types::{Timestamp, UserId};

use crate::models::reminder::{CreateReminder, Reminder, REMINDER_FAILED, REMINDER_PENDING, REMINDER_SENT};

const COLUMNS: &str = "id, user_id, email, name, due_at, status, provider_message_id, error, \
                       created_at, sent_at";

pub struct ReminderRepo;

impl ReminderRepo {
    pub async fn create(pool: &PgPool, input: &CreateReminder) -> Result<Reminder, sqlx::Error> {
        let query = format!(
            "INSERT INTO reminders (id, user_id, email, name, due_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.due_at)
            .fetch_one(pool)
            .await
    }

    /// Pending reminders due at or before `now`, oldest first.
    pub async fn list_due(pool: &PgPool, now: Timestamp) -> Result<Vec<Reminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reminders
             WHERE status = $1 AND due_at <= $2
             ORDER BY due_at"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(REMINDER_PENDING)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_sent(
        pool: &PgPool,
        id: Uuid,
        provider_message_id: Option<&str>,
        sent_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE reminders SET status = $2, provider_message_id = $3, sent_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(REMINDER_SENT)
        .bind(provider_message_id)
        .bind(sent_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(pool: &PgPool, id: Uuid, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reminders SET status = $2, error = $3 WHERE id = $1")
            .bind(id)
            .bind(REMINDER_FAILED)
            .bind(error)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Drop reminders that have not gone out yet. Returns the number removed.
    pub async fn delete_pending_for_user(pool: &PgPool, user_id: UserId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE user_id = $1 AND status = $2")
            .bind(user_id)
            .bind(REMINDER_PENDING)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
