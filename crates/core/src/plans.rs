//! Subscription plans, billing cycles and subscription status values.
//!
//! These are stored as lowercase strings on the user record and travel as
//! Stripe metadata, so every enum carries a `from_str_db` / `as_str` pair.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Plan tier
// ---------------------------------------------------------------------------

/// Subscription level, gating feature and question visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Launch,
    Business,
    Enterprise,
}

/// Every tier, cheapest first.
pub const ALL_PLANS: &[PlanTier] = &[PlanTier::Launch, PlanTier::Business, PlanTier::Enterprise];

impl PlanTier {
    /// Parse a plan string from the database or from Stripe metadata.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "launch" => Ok(Self::Launch),
            "business" => Ok(Self::Business),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(CoreError::Validation(format!(
                "Invalid plan '{s}'. Must be one of: launch, business, enterprise"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Business => "business",
            Self::Enterprise => "enterprise",
        }
    }

    /// Number of professional mailbox slots included in the plan.
    pub fn professional_email_slots(self) -> usize {
        match self {
            Self::Launch => 1,
            Self::Business => 3,
            Self::Enterprise => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Billing cycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(CoreError::Validation(format!(
                "Invalid billing cycle '{s}'. Must be one of: monthly, annual"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "canceled" => Ok(Self::Canceled),
            _ => Err(CoreError::Validation(format!(
                "Invalid subscription status '{s}'. Must be one of: pending, active, canceled"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Canceled => "canceled",
        }
    }
}
