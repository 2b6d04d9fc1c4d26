use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{errors::StartupError, routes, state::AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when present, otherwise defaults plus env.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            info!(reason = %e, "config file not used, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

/// Connect, migrate and wire the marketplace. Drops to mock data when the
/// database is unreachable and `storage.mock_fallback` allows it.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let db = match models::db::connect_with_config(&cfg.database).await {
        Ok(db) => db,
        Err(e) if cfg.storage.mock_fallback => {
            warn!(error = %e, "database unavailable, serving read-only mock data");
            return Ok(AppState::mock());
        }
        Err(e) => return Err(StartupError::Database(e.to_string())),
    };
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
        info!("migrations applied");
    }
    let marketplace = service::runtime::build_marketplace(db, cfg).await?;
    Ok(AppState::live(marketplace))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = load_config()?;
    let state = build_state(&cfg).await?;
    let mode = if state.is_mock() { "mock" } else { "live" };
    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, mode, primary = %cfg.storage.primary, "starting solutil connect api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
