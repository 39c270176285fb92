use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription state as reported by the billing side.
///
/// Billing has historically emitted both `trialing` and `trial`, so both are
/// accepted. Anything unrecognised parses as `Inactive` — an unknown status
/// must never widen what a tenant is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Trial,
    #[serde(other)]
    Inactive,
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "trial" => SubscriptionStatus::Trial,
            _ => SubscriptionStatus::Inactive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Inactive => "inactive",
        }
    }

    /// Whether the subscription entitles the tenant to billable activity
    /// (order creation). Trials count as billable.
    pub fn is_billable(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::Trial
        )
    }
}

/// A billing customer. Read-only from the admission engine's perspective —
/// signup and plan-change flows own mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    /// Reference to the current plan. Absent when provisioning never
    /// completed; the engine treats that as a configuration error, not as
    /// "no limits".
    pub plan_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
