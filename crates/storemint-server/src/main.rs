use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use storemint_server::app::build_app;
use storemint_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storemint=info".parse()?),
        )
        .json()
        .init();

    let cfg = storemint_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Ensure data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/storemint.db", cfg.data_dir);

    // Open DuckDB — initialises the schema and seeds the built-in plans.
    let db = storemint_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    let state = Arc::new(AppState::new(db, cfg));
    let app = build_app(Arc::clone(&state));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Storemint listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
