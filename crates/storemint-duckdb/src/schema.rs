/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is a DuckDB size string (`"512MB"`, `"1GB"`, ...) passed
/// from `Config.duckdb_memory_limit`. An explicit limit is always set — the
/// DuckDB default of 80% of system RAM is not acceptable for a server
/// process. `SET threads = 2` keeps the background thread pool small; the
/// connection is single-writer behind a mutex anyway.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- PLANS
-- ===========================================
-- Subscription tiers. Limit columns are nullable BIGINTs:
-- NULL means unlimited (Limit::Unlimited), never "unset".
CREATE TABLE IF NOT EXISTS plans (
    id                    VARCHAR PRIMARY KEY,     -- e.g. 'plan_free'
    name                  VARCHAR NOT NULL,        -- e.g. 'free', 'pro'
    max_staff             BIGINT,                  -- NULL = unlimited
    max_orders_per_month  BIGINT,                  -- NULL = unlimited
    created_at            TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at            TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- TENANTS
-- ===========================================
CREATE TABLE IF NOT EXISTS tenants (
    id                   VARCHAR PRIMARY KEY,      -- 'ten_' + nanoid(10)
    plan_id              VARCHAR,                  -- NULL when provisioning never completed
    subscription_status  VARCHAR NOT NULL DEFAULT 'inactive',
    trial_ends_at        TIMESTAMP,
    created_at           TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at           TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_tenants_plan ON tenants(plan_id);

-- ===========================================
-- STAFF
-- ===========================================
-- Staff counts are all-time per tenant, so only the tenant index matters.
CREATE TABLE IF NOT EXISTS staff (
    id          VARCHAR PRIMARY KEY,               -- 'stf_' + nanoid(10)
    tenant_id   VARCHAR NOT NULL,
    email       VARCHAR NOT NULL,
    name        VARCHAR NOT NULL,
    created_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_staff_tenant ON staff(tenant_id);

-- ===========================================
-- ORDERS
-- ===========================================
-- Order counts are windowed to the current UTC calendar month, so the index
-- covers (tenant_id, created_at).
CREATE TABLE IF NOT EXISTS orders (
    id           VARCHAR PRIMARY KEY,              -- 'ord_' + nanoid(10)
    tenant_id    VARCHAR NOT NULL,
    total_cents  BIGINT NOT NULL,
    currency     VARCHAR(3) NOT NULL DEFAULT 'USD',
    created_at   TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_orders_tenant_created ON orders(tenant_id, created_at);
"#
    )
}
