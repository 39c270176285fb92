use std::sync::Arc;

use storemint_core::config::Config;
use storemint_core::quota::QuotaEngine;
use storemint_duckdb::DuckDbBackend;

/// Shared application state injected into every axum handler via
/// [`axum::extract::State`].
///
/// The backend serves as both of the engine's storage dependencies: it
/// implements `TenantStore` (plan resolution) and `UsageStore` (live counts).
pub struct AppState {
    pub db: Arc<DuckDbBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// The admission decision engine. Stateless; every decision re-reads the
    /// plan and the live count through `db`.
    pub quota: QuotaEngine,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            quota: QuotaEngine::new(db.clone(), db.clone()),
            db,
            config: Arc::new(config),
        }
    }
}
