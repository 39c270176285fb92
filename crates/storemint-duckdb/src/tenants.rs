use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;

use storemint_core::plan::{Limit, Plan, PlanLimits};
use storemint_core::quota::TenantStore;
use storemint_core::tenant::{SubscriptionStatus, Tenant};

use crate::backend::{generate_id, DuckDbBackend};

#[derive(Debug, Clone)]
pub struct CreateTenantParams {
    /// Caller-supplied id (billing-side ids are preserved); generated when
    /// absent.
    pub id: Option<String>,
    pub plan_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
}

impl DuckDbBackend {
    pub async fn create_tenant(&self, params: CreateTenantParams) -> Result<Tenant> {
        let conn = self.conn.lock().await;
        let id = params.id.unwrap_or_else(|| generate_id("ten"));

        conn.execute(
            "INSERT INTO tenants (id, plan_id, subscription_status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
            duckdb::params![
                id,
                params.plan_id,
                params.subscription_status.as_str(),
            ],
        )?;

        // Read back the created row to get timestamps.
        let mut stmt = conn.prepare(
            "SELECT id, plan_id, subscription_status, epoch_ms(trial_ends_at), epoch_ms(created_at) \
             FROM tenants WHERE id = ?1",
        )?;
        let tenant = stmt.query_row(duckdb::params![id], map_tenant_row)?;
        Ok(tenant)
    }

    pub async fn set_subscription_status(
        &self,
        tenant_id: &str,
        status: SubscriptionStatus,
    ) -> Result<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE tenants SET subscription_status = ?1, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?2",
            duckdb::params![status.as_str(), tenant_id],
        )?;
        Ok(changed > 0)
    }

    /// Create or update a plan row. Limit values of `None` mean unlimited.
    pub async fn upsert_plan(&self, id: &str, name: &str, limits: PlanLimits) -> Result<Plan> {
        let conn = self.conn.lock().await;
        // DuckDB resolves CURRENT_TIMESTAMP inside DO UPDATE SET as a column
        // reference; now() binds as a plain function call.
        conn.execute(
            "INSERT INTO plans (id, name, max_staff, max_orders_per_month) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 max_staff = EXCLUDED.max_staff, \
                 max_orders_per_month = EXCLUDED.max_orders_per_month, \
                 updated_at = now()",
            duckdb::params![
                id,
                name,
                limits.max_staff.as_column(),
                limits.max_orders_per_month.as_column(),
            ],
        )?;
        Ok(Plan {
            id: id.to_string(),
            name: name.to_string(),
            limits,
        })
    }
}

fn map_tenant_row(row: &duckdb::Row<'_>) -> duckdb::Result<Tenant> {
    let status: String = row.get(2)?;
    let trial_ends_ms: Option<i64> = row.get(3)?;
    let created_ms: i64 = row.get(4)?;
    Ok(Tenant {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        subscription_status: SubscriptionStatus::parse(&status),
        trial_ends_at: trial_ends_ms.and_then(DateTime::from_timestamp_millis),
        created_at: DateTime::from_timestamp_millis(created_ms).unwrap_or_default(),
    })
}

#[async_trait]
impl TenantStore for DuckDbBackend {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, plan_id, subscription_status, epoch_ms(trial_ends_at), epoch_ms(created_at) \
             FROM tenants WHERE id = ?1",
        )?;
        match stmt.query_row(duckdb::params![tenant_id], map_tenant_row) {
            Ok(tenant) => Ok(Some(tenant)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow::anyhow!(e)),
        }
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, max_staff, max_orders_per_month FROM plans WHERE id = ?1",
        )?;
        match stmt.query_row(duckdb::params![plan_id], |row| {
            Ok(Plan {
                id: row.get(0)?,
                name: row.get(1)?,
                limits: PlanLimits {
                    max_staff: Limit::from_column(row.get::<_, Option<i64>>(2)?),
                    max_orders_per_month: Limit::from_column(row.get::<_, Option<i64>>(3)?),
                },
            })
        }) {
            Ok(plan) => Ok(Some(plan)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow::anyhow!(e)),
        }
    }
}
