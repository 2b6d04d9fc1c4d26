//! Runtime wiring helpers
//!
//! Builds the stores, the dual-write strategy and the managers so binary
//! crates do not assemble them by hand.

use std::sync::Arc;

use configs::{AppConfig, MarketplaceConfig};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{
    dual_write::{DualWriteStrategy, RoutingConfig, SyncLedger},
    marketplace::Marketplace,
    storage::{FileDocumentStore, MemoryDocumentStore, SeaOrmDocumentStore, StoreKind},
};

/// Postgres plus the JSON file mirror, routed per `[storage]`.
pub async fn build_marketplace(db: DatabaseConnection, cfg: &AppConfig) -> anyhow::Result<Marketplace> {
    common::env::ensure_parent_dir(&cfg.storage.file_path).await?;
    let postgres = Arc::new(SeaOrmDocumentStore::new(db));
    let file = Arc::new(FileDocumentStore::open(&cfg.storage.file_path).await?);
    let strategy = DualWriteStrategy::from_config(postgres, file, &cfg.storage)?;
    info!(
        primary = %cfg.storage.primary,
        dual_write = cfg.storage.dual_write,
        file_path = %cfg.storage.file_path,
        "storage ready"
    );
    Ok(Marketplace::new(Arc::new(strategy), cfg.marketplace.clone()))
}

/// Handles returned by [`in_memory_marketplace`] for inspecting both slots.
pub struct InMemoryMarketplace {
    pub marketplace: Marketplace,
    pub postgres: Arc<MemoryDocumentStore>,
    pub file: Arc<MemoryDocumentStore>,
}

/// Marketplace over two in-process stores. Requires a tokio runtime.
pub fn in_memory_marketplace(routing: RoutingConfig, settings: MarketplaceConfig) -> InMemoryMarketplace {
    let postgres = Arc::new(MemoryDocumentStore::new(StoreKind::Postgres));
    let file = Arc::new(MemoryDocumentStore::new(StoreKind::File));
    let strategy = DualWriteStrategy::new(postgres.clone(), file.clone(), routing, SyncLedger::spawn(1000));
    InMemoryMarketplace { marketplace: Marketplace::new(Arc::new(strategy), settings), postgres, file }
}
