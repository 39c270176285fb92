use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::plan::{Limit, Plan};
use crate::tenant::Tenant;

/// Resource kinds subject to plan quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Staff,
    Order,
}

impl ResourceKind {
    /// Human noun used in limit-exceeded messages, e.g.
    /// "limited to 3 staff" / "limited to 100 orders per month".
    pub fn quota_noun(&self) -> &'static str {
        match self {
            ResourceKind::Staff => "staff",
            ResourceKind::Order => "orders per month",
        }
    }
}

/// Half-open interval `[start, end)` over which order usage is counted.
///
/// Computed in UTC: the source system used the server's local clock, which
/// moves the month boundary per deployment, so the boundary is pinned here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingWindow {
    /// The current UTC calendar month as of `now`: start is the first instant
    /// of the month with time-of-day zeroed, end is `now` (exclusive).
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        Self { start, end: now }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Why a creation request was refused. Every deny carries a distinct,
/// user-actionable reason; there is no generic rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The tenant id does not resolve to a stored tenant.
    TenantNotFound,
    /// The tenant has no plan, or its plan reference dangles.
    PlanNotFound,
    /// Subscription status does not permit billable activity (orders only).
    SubscriptionInactive,
    /// Usage is at or above the plan ceiling.
    LimitExceeded {
        plan: String,
        kind: ResourceKind,
        limit: i64,
        used: i64,
    },
}

/// Outcome of one admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Deny(DenyReason),
}

/// Read access to tenants and plans (the Plan Resolver's leaf dependency).
///
/// `Ok(None)` means "not stored"; I/O failures are `Err` and must never be
/// collapsed into an admit by callers.
#[async_trait]
pub trait TenantStore: Send + Sync + 'static {
    async fn get_tenant(&self, tenant_id: &str) -> anyhow::Result<Option<Tenant>>;
    async fn get_plan(&self, plan_id: &str) -> anyhow::Result<Option<Plan>>;
}

/// Read access to current resource counts (the Usage Counter's leaf
/// dependency). Zero matching rows is `Ok(0)`, not an error.
#[async_trait]
pub trait UsageStore: Send + Sync + 'static {
    /// All-time staff count for the tenant.
    async fn count_staff(&self, tenant_id: &str) -> anyhow::Result<i64>;
    /// Orders created within `window` for the tenant.
    async fn count_orders(&self, tenant_id: &str, window: &BillingWindow) -> anyhow::Result<i64>;
}

/// Per-kind slice of a [`UsageReport`].
#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    pub used: i64,
    pub limit: Limit,
}

/// Current usage snapshot for a tenant, served by `GET /api/usage`.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub plan: String,
    pub subscription_status: crate::tenant::SubscriptionStatus,
    pub window: BillingWindow,
    pub staff: UsageEntry,
    pub orders: UsageEntry,
}

/// The admission decision engine.
///
/// Stateless: every call re-reads the plan and the live count, so a decision
/// is a fresh snapshot rather than cached state. The quota is advisory —
/// the count-read and the caller's subsequent insert are not atomic, so two
/// concurrent requests can both observe `used == limit - 1` and overshoot the
/// ceiling by one. That matches the product's soft-enforcement semantics; the
/// engine itself performs only reads and needs no rollback on cancellation.
#[derive(Clone)]
pub struct QuotaEngine {
    tenants: Arc<dyn TenantStore>,
    usage: Arc<dyn UsageStore>,
}

impl QuotaEngine {
    pub fn new(tenants: Arc<dyn TenantStore>, usage: Arc<dyn UsageStore>) -> Self {
        Self { tenants, usage }
    }

    /// Load the tenant and dereference its plan.
    ///
    /// The plan lookup is an explicit second read with its own not-found
    /// branch — a dangling `plan_id` is a misprovisioned tenant, not a tenant
    /// with no limits.
    async fn resolve_plan(&self, tenant_id: &str) -> anyhow::Result<Result<(Tenant, Plan), DenyReason>> {
        let Some(tenant) = self.tenants.get_tenant(tenant_id).await? else {
            return Ok(Err(DenyReason::TenantNotFound));
        };
        let Some(plan_id) = tenant.plan_id.clone() else {
            return Ok(Err(DenyReason::PlanNotFound));
        };
        let Some(plan) = self.tenants.get_plan(&plan_id).await? else {
            return Ok(Err(DenyReason::PlanNotFound));
        };
        Ok(Ok((tenant, plan)))
    }

    /// Decide whether `tenant_id` may create one more resource of `kind`.
    ///
    /// Pipeline: resolve plan → (orders only) subscription status → plan
    /// limit → live count → compare. An unlimited limit admits before the
    /// count is read. `used >= limit` denies: the limit is the maximum
    /// allowed existing count, so a limit of 0 refuses all creation.
    ///
    /// Storage failures surface as `Err`; callers must fail closed.
    pub async fn decide(
        &self,
        tenant_id: &str,
        kind: ResourceKind,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Decision> {
        let (tenant, plan) = match self.resolve_plan(tenant_id).await? {
            Ok(resolved) => resolved,
            Err(reason) => return Ok(Decision::Deny(reason)),
        };

        if kind == ResourceKind::Order && !tenant.subscription_status.is_billable() {
            return Ok(Decision::Deny(DenyReason::SubscriptionInactive));
        }

        let limit = match kind {
            ResourceKind::Staff => plan.limits.max_staff,
            ResourceKind::Order => plan.limits.max_orders_per_month,
        };
        let Limit::AtMost(limit) = limit else {
            return Ok(Decision::Admit);
        };

        let used = match kind {
            ResourceKind::Staff => self.usage.count_staff(tenant_id).await?,
            ResourceKind::Order => {
                self.usage
                    .count_orders(tenant_id, &BillingWindow::month_of(now))
                    .await?
            }
        };

        if used >= limit {
            tracing::info!(
                tenant_id,
                kind = ?kind,
                limit,
                used,
                plan = %plan.name,
                "admission denied: plan limit reached"
            );
            return Ok(Decision::Deny(DenyReason::LimitExceeded {
                plan: plan.name,
                kind,
                limit,
                used,
            }));
        }
        Ok(Decision::Admit)
    }

    /// Current-month usage snapshot for the usage endpoint.
    pub async fn usage_report(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Result<UsageReport, DenyReason>> {
        let (tenant, plan) = match self.resolve_plan(tenant_id).await? {
            Ok(resolved) => resolved,
            Err(reason) => return Ok(Err(reason)),
        };
        let window = BillingWindow::month_of(now);
        let staff_used = self.usage.count_staff(tenant_id).await?;
        let orders_used = self.usage.count_orders(tenant_id, &window).await?;
        Ok(Ok(UsageReport {
            plan: plan.name,
            subscription_status: tenant.subscription_status,
            window,
            staff: UsageEntry {
                used: staff_used,
                limit: plan.limits.max_staff,
            },
            orders: UsageEntry {
                used: orders_used,
                limit: plan.limits.max_orders_per_month,
            },
        }))
    }
}
