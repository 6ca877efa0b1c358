//! Questionnaire reminder model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use webdash_core::types::{Timestamp, UserId};

pub const REMINDER_PENDING: &str = "pending";
pub const REMINDER_SENT: &str = "sent";
pub const REMINDER_FAILED: &str = "failed";

/// A deferred reminder email from the `reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub due_at: Timestamp,
    pub status: String,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub sent_at: Option<Timestamp>,
}

/// DTO for scheduling a reminder.
#[derive(Debug, Clone)]
pub struct CreateReminder {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub due_at: Timestamp,
}
