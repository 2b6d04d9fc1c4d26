use std::{env, time::Duration};

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Connect using the pool settings from `[database]`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    if !cfg.is_configured() {
        return Err(anyhow::anyhow!("database.url is not configured"));
    }
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    info!(max_connections = cfg.max_connections, "database connected");
    Ok(db)
}

/// Database tests run only with `DATABASE_URL` set and `SKIP_DB_TESTS` unset.
pub fn db_tests_enabled() -> bool {
    let _ = dotenvy::dotenv();
    env::var("DATABASE_URL").is_ok() && env::var("SKIP_DB_TESTS").is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_url_is_refused_before_dialing() {
        let err = connect_with_config(&DatabaseConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }
}
