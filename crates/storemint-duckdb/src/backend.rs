use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::init_sql;

/// Generate a record ID: `prefix` + '_' + 10 random alphanumeric chars.
pub(crate) fn generate_id(prefix: &str) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: String = (0..10)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect();
    format!("{prefix}_{chars}")
}

/// The DuckDB storage backend for Storemint.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent writes
/// cause contention. The connection is wrapped in `Arc<Mutex<_>>` so the
/// async runtime serialises access while the struct stays cheap to clone and
/// share across axum handlers.
///
/// Implements both `TenantStore` (plan resolution) and `UsageStore` (live
/// resource counts) from `storemint-core`, plus the creation operations the
/// HTTP layer runs after an admitted request.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// Runs the idempotent schema init and seeds the default plan rows so a
    /// fresh install is usable without an extra provisioning step.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        Self::seed_plans_sync(&conn)?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests — data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Self::seed_plans_sync(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed the built-in plans if they don't already exist.
    ///
    /// Uses `INSERT OR IGNORE` so re-runs on every startup are safe and
    /// operator edits to limit columns are never clobbered.
    /// - `plan_free`: 3 staff, 100 orders/month
    /// - `plan_pro`:  10 staff, unlimited orders
    fn seed_plans_sync(conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO plans (id, name, max_staff, max_orders_per_month) \
             VALUES ('plan_free', 'free', 3, 100)",
            [],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO plans (id, name, max_staff, max_orders_per_month) \
             VALUES ('plan_pro', 'pro', 10, NULL)",
            [],
        )?;
        Ok(())
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint. Returns an error if the connection
    /// is unavailable (file locked, disk full, etc.).
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT 1")?;
        let _: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(())
    }
}
