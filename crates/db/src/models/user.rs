//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use webdash_core::plans::{BillingCycle, PlanTier, SubscriptionStatus};
use webdash_core::questionnaire::Answers;
use webdash_core::types::{Timestamp, UserId};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub plan_type: Option<String>,
    pub billing_cycle: Option<String>,
    pub has_paid: bool,
    pub subscription_status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub completed_questionnaire: bool,
    pub questionnaire_answers: Json<Answers>,
    pub current_question_index: i32,
    pub project_phases: Json<Vec<ProjectPhase>>,
    pub website_url: Option<String>,
    pub editor_url: Option<String>,
    pub revision_url: Option<String>,
    pub feedback: Json<Vec<FeedbackEntry>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parsed plan tier; unknown stored values read as no plan.
    pub fn plan(&self) -> Option<PlanTier> {
        self.plan_type
            .as_deref()
            .and_then(|p| PlanTier::from_str_db(p).ok())
    }

    pub fn cycle(&self) -> Option<BillingCycle> {
        self.billing_cycle
            .as_deref()
            .and_then(|c| BillingCycle::from_str_db(c).ok())
    }

    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_str_db(&self.subscription_status)
            .unwrap_or(SubscriptionStatus::Pending)
    }

    pub fn answers(&self) -> &Answers {
        &self.questionnaire_answers.0
    }
}

/// One stage of the website project, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPhase {
    pub name: String,
    /// `pending`, `in_progress` or `completed`.
    pub status: String,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// A message the customer left on their dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub message: String,
    pub created_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub plan_type: Option<String>,
    pub billing_cycle: Option<String>,
    pub has_paid: bool,
    pub subscription_status: String,
    pub completed_questionnaire: bool,
    pub website_url: Option<String>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role.clone(),
            plan_type: user.plan_type.clone(),
            billing_cycle: user.billing_cycle.clone(),
            has_paid: user.has_paid,
            subscription_status: user.subscription_status.clone(),
            completed_questionnaire: user.completed_questionnaire,
            website_url: user.website_url.clone(),
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
}

/// Plan and payment changes. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateBilling {
    pub plan_type: Option<String>,
    pub billing_cycle: Option<String>,
    pub has_paid: Option<bool>,
    pub subscription_status: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

/// Project progress changes made by agency staff. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub project_phases: Option<Vec<ProjectPhase>>,
    pub website_url: Option<String>,
    pub editor_url: Option<String>,
    pub revision_url: Option<String>,
}
