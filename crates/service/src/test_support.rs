#![cfg(test)]
use std::sync::Arc;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::{
    dual_write::{DualWriteStrategy, RoutingConfig, SyncLedger},
    storage::{MemoryDocumentStore, StoreKind},
};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_db_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig::default();
    cfg.normalize_from_env();
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            let db = connect_with_config(&test_db_config()).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    connect_with_config(&test_db_config()).await
}

/// Two in-memory stores wired as postgres (primary) and file (secondary).
pub struct MemoryPair {
    pub postgres: Arc<MemoryDocumentStore>,
    pub file: Arc<MemoryDocumentStore>,
    pub strategy: Arc<DualWriteStrategy>,
}

pub fn memory_pair(routing: RoutingConfig) -> MemoryPair {
    let postgres = Arc::new(MemoryDocumentStore::new(StoreKind::Postgres));
    let file = Arc::new(MemoryDocumentStore::new(StoreKind::File));
    let strategy = Arc::new(DualWriteStrategy::new(
        postgres.clone(),
        file.clone(),
        routing,
        SyncLedger::spawn(100),
    ));
    MemoryPair { postgres, file, strategy }
}
