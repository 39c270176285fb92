use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use storemint_core::quota::{BillingWindow, UsageStore};

use crate::backend::{generate_id, DuckDbBackend};

#[derive(Debug, Clone, Serialize)]
pub struct StaffMember {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub total_cents: i64,
    pub currency: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateStaffParams {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub total_cents: i64,
    pub currency: Option<String>,
    /// Explicit creation timestamp for backfill/import paths; `None` uses the
    /// database clock.
    pub created_at: Option<DateTime<Utc>>,
}

impl DuckDbBackend {
    /// Insert a staff row. Admission has already been decided by the caller;
    /// this write is not atomic with that check (soft quota).
    pub async fn create_staff(
        &self,
        tenant_id: &str,
        params: CreateStaffParams,
    ) -> Result<StaffMember> {
        let conn = self.conn.lock().await;
        let id = generate_id("stf");

        conn.execute(
            "INSERT INTO staff (id, tenant_id, email, name, created_at) \
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)",
            duckdb::params![id, tenant_id, params.email, params.name],
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, email, name, CAST(created_at AS VARCHAR) \
             FROM staff WHERE id = ?1",
        )?;
        let staff = stmt.query_row(duckdb::params![id], |row| {
            Ok(StaffMember {
                id: row.get(0)?,
                tenant_id: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(staff)
    }

    pub async fn create_order(
        &self,
        tenant_id: &str,
        params: CreateOrderParams,
    ) -> Result<Order> {
        let conn = self.conn.lock().await;
        let id = generate_id("ord");
        let currency = params.currency.unwrap_or_else(|| "USD".to_string());

        conn.execute(
            "INSERT INTO orders (id, tenant_id, total_cents, currency, created_at) \
             VALUES (?1, ?2, ?3, ?4, \
                     COALESCE(CAST(?5 AS TIMESTAMP), CURRENT_TIMESTAMP))",
            duckdb::params![
                id,
                tenant_id,
                params.total_cents,
                currency,
                params.created_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, total_cents, currency, CAST(created_at AS VARCHAR) \
             FROM orders WHERE id = ?1",
        )?;
        let order = stmt.query_row(duckdb::params![id], |row| {
            Ok(Order {
                id: row.get(0)?,
                tenant_id: row.get(1)?,
                total_cents: row.get(2)?,
                currency: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(order)
    }
}

#[async_trait]
impl UsageStore for DuckDbBackend {
    async fn count_staff(&self, tenant_id: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM staff WHERE tenant_id = ?1")?;
        let count: i64 = stmt.query_row(duckdb::params![tenant_id], |row| row.get(0))?;
        Ok(count)
    }

    async fn count_orders(&self, tenant_id: &str, window: &BillingWindow) -> Result<i64> {
        let conn = self.conn.lock().await;
        // Half-open [start, end): the boundary instants match the engine's
        // window semantics exactly.
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM orders \
             WHERE tenant_id = ?1 \
               AND created_at >= CAST(?2 AS TIMESTAMP) \
               AND created_at <  CAST(?3 AS TIMESTAMP)",
        )?;
        let count: i64 = stmt.query_row(
            duckdb::params![
                tenant_id,
                window.start.to_rfc3339(),
                window.end.to_rfc3339(),
            ],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
