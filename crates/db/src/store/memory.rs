//! In-process [`DocumentStore`] for local development and tests.
//!
//! Mirrors the Postgres semantics that callers rely on: unique emails,
//! `COALESCE`-style partial updates, single-shot questionnaire completion and
//! pending-only reminder deletion. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;
use webdash_core::plans::SubscriptionStatus;
use webdash_core::questionnaire::Answers;
use webdash_core::types::{Timestamp, UserId};

use super::{DocumentStore, StoreError};
use crate::models::reminder::{
    CreateReminder, Reminder, REMINDER_FAILED, REMINDER_PENDING, REMINDER_SENT,
};
use crate::models::user::{CreateUser, FeedbackEntry, UpdateBilling, UpdateProject, User};
use crate::models::verification_code::VerificationCode;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    codes: RwLock<HashMap<String, VerificationCode>>,
    reminders: RwLock<HashMap<Uuid, Reminder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a stored user and return the updated copy.
    async fn modify_user<F>(&self, id: UserId, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id)?;
        f(user);
        user.updated_at = Utc::now();
        Some(user.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict("uq_users_email".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            name: input.name,
            phone: input.phone,
            role: input.role,
            plan_type: None,
            billing_cycle: None,
            has_paid: false,
            subscription_status: SubscriptionStatus::Pending.as_str().to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            completed_questionnaire: false,
            questionnaire_answers: Json(Answers::new()),
            current_question_index: 0,
            project_phases: Json(Vec::new()),
            website_url: None,
            editor_url: None,
            revision_url: None,
            feedback: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_customer_id(&self, customer_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.stripe_customer_id.as_deref() == Some(customer_id))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            self.reminders.write().await.retain(|_, r| r.user_id != id);
        }
        Ok(removed)
    }

    async fn update_billing(&self, id: UserId, input: UpdateBilling) -> Result<Option<User>, StoreError> {
        Ok(self
            .modify_user(id, |user| {
                if let Some(plan) = input.plan_type {
                    user.plan_type = Some(plan);
                }
                if let Some(cycle) = input.billing_cycle {
                    user.billing_cycle = Some(cycle);
                }
                if let Some(paid) = input.has_paid {
                    user.has_paid = paid;
                }
                if let Some(status) = input.subscription_status {
                    user.subscription_status = status;
                }
                if let Some(customer) = input.stripe_customer_id {
                    user.stripe_customer_id = Some(customer);
                }
                if let Some(subscription) = input.stripe_subscription_id {
                    user.stripe_subscription_id = Some(subscription);
                }
            })
            .await)
    }

    async fn update_project(&self, id: UserId, input: UpdateProject) -> Result<Option<User>, StoreError> {
        Ok(self
            .modify_user(id, |user| {
                if let Some(phases) = input.project_phases {
                    user.project_phases = Json(phases);
                }
                if let Some(url) = input.website_url {
                    user.website_url = Some(url);
                }
                if let Some(url) = input.editor_url {
                    user.editor_url = Some(url);
                }
                if let Some(url) = input.revision_url {
                    user.revision_url = Some(url);
                }
            })
            .await)
    }

    async fn save_answers(
        &self,
        id: UserId,
        answers: Answers,
        current_index: Option<i32>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .modify_user(id, |user| {
                user.questionnaire_answers = Json(answers);
                if let Some(index) = current_index {
                    user.current_question_index = index;
                }
            })
            .await)
    }

    async fn complete_questionnaire(&self, id: UserId, answers: Answers) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if user.completed_questionnaire {
            return Ok(None);
        }
        user.questionnaire_answers = Json(answers);
        user.completed_questionnaire = true;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn append_feedback(&self, id: UserId, entry: FeedbackEntry) -> Result<Option<User>, StoreError> {
        Ok(self.modify_user(id, |user| user.feedback.0.push(entry)).await)
    }

    async fn upsert_verification_code(&self, code: VerificationCode) -> Result<(), StoreError> {
        self.codes.write().await.insert(code.key.clone(), code);
        Ok(())
    }

    async fn find_verification_code(&self, key: &str) -> Result<Option<VerificationCode>, StoreError> {
        Ok(self.codes.read().await.get(key).cloned())
    }

    async fn delete_verification_code(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.codes.write().await.remove(key).is_some())
    }

    async fn create_reminder(&self, input: CreateReminder) -> Result<Reminder, StoreError> {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            email: input.email,
            name: input.name,
            due_at: input.due_at,
            status: REMINDER_PENDING.to_string(),
            provider_message_id: None,
            error: None,
            created_at: Utc::now(),
            sent_at: None,
        };
        self.reminders.write().await.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn list_due_reminders(&self, now: Timestamp) -> Result<Vec<Reminder>, StoreError> {
        let mut due: Vec<Reminder> = self
            .reminders
            .read()
            .await
            .values()
            .filter(|r| r.status == REMINDER_PENDING && r.due_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.due_at);
        Ok(due)
    }

    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        provider_message_id: Option<String>,
        sent_at: Timestamp,
    ) -> Result<(), StoreError> {
        if let Some(reminder) = self.reminders.write().await.get_mut(&id) {
            reminder.status = REMINDER_SENT.to_string();
            reminder.provider_message_id = provider_message_id;
            reminder.sent_at = Some(sent_at);
        }
        Ok(())
    }

    async fn mark_reminder_failed(&self, id: Uuid, error: String) -> Result<(), StoreError> {
        if let Some(reminder) = self.reminders.write().await.get_mut(&id) {
            reminder.status = REMINDER_FAILED.to_string();
            reminder.error = Some(error);
        }
        Ok(())
    }

    async fn delete_pending_reminders(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut reminders = self.reminders.write().await;
        let before = reminders.len();
        reminders.retain(|_, r| !(r.user_id == user_id && r.status == REMINDER_PENDING));
        Ok((before - reminders.len()) as u64)
    }
}
