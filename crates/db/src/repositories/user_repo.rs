//! Repository for the `users` table.

use sqlx::types::Json;
use sqlx::PgPool;
use webdash_core::questionnaire::Answers;
use webdash_core::types::UserId;

use crate::models::user::{CreateUser, FeedbackEntry, UpdateBilling, UpdateProject, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, name, phone, role, plan_type, billing_cycle, \
                       has_paid, subscription_status, stripe_customer_id, stripe_subscription_id, \
                       completed_questionnaire, questionnaire_answers, current_question_index, \
                       project_phases, website_url, editor_url, revision_url, feedback, \
                       created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a fresh v4 id, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, password_hash, name, phone, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased, so callers pass a
    /// normalized address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the user linked to a Stripe customer.
    pub async fn find_by_customer_id(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE stripe_customer_id = $1
             ORDER BY created_at LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Permanently delete a user. Reminders cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply plan and payment changes. Only non-`None` fields are applied.
    pub async fn update_billing(
        pool: &PgPool,
        id: UserId,
        input: &UpdateBilling,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                plan_type = COALESCE($2, plan_type),
                billing_cycle = COALESCE($3, billing_cycle),
                has_paid = COALESCE($4, has_paid),
                subscription_status = COALESCE($5, subscription_status),
                stripe_customer_id = COALESCE($6, stripe_customer_id),
                stripe_subscription_id = COALESCE($7, stripe_subscription_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.plan_type)
            .bind(&input.billing_cycle)
            .bind(input.has_paid)
            .bind(&input.subscription_status)
            .bind(&input.stripe_customer_id)
            .bind(&input.stripe_subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply project progress changes. Only non-`None` fields are applied.
    pub async fn update_project(
        pool: &PgPool,
        id: UserId,
        input: &UpdateProject,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                project_phases = COALESCE($2, project_phases),
                website_url = COALESCE($3, website_url),
                editor_url = COALESCE($4, editor_url),
                revision_url = COALESCE($5, revision_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.project_phases.as_ref().map(Json))
            .bind(&input.website_url)
            .bind(&input.editor_url)
            .bind(&input.revision_url)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored answers and, when given, the resume position.
    pub async fn save_answers(
        pool: &PgPool,
        id: UserId,
        answers: &Answers,
        current_index: Option<i32>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                questionnaire_answers = $2,
                current_question_index = COALESCE($3, current_question_index)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(answers))
            .bind(current_index)
            .fetch_optional(pool)
            .await
    }

    /// Store the final answers and mark the questionnaire complete.
    ///
    /// Returns `None` when the user does not exist or has already submitted.
    pub async fn complete_questionnaire(
        pool: &PgPool,
        id: UserId,
        answers: &Answers,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                questionnaire_answers = $2,
                completed_questionnaire = TRUE
             WHERE id = $1 AND completed_questionnaire = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(answers))
            .fetch_optional(pool)
            .await
    }

    /// Append one entry to the user's feedback log.
    pub async fn append_feedback(
        pool: &PgPool,
        id: UserId,
        entry: &FeedbackEntry,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET feedback = feedback || $2::jsonb WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(vec![entry]))
            .fetch_optional(pool)
            .await
    }
}
