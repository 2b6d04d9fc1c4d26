//! Best-effort dual writes across the postgres and file stores.
//!
//! Writes go to the primary first and are then mirrored to the secondary.
//! Secondary failures never fail the request: they are queued in the
//! [`SyncLedger`] and replayed by [`DualWriteStrategy::sync_data_inconsistencies`].

pub mod ledger;

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use configs::StorageConfig;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    metrics::{DUAL_WRITES_TOTAL, FALLBACK_READS_TOTAL, SYNC_ERRORS_TOTAL, SYNC_REPLAYS_TOTAL},
    storage::{document_id, ensure_id, DocumentStore, StoreError, StoreKind, UnknownStoreKind},
};

pub use ledger::{LedgerSnapshot, OperationRecord, SecondaryOutcome, SyncError, SyncLedger, WriteOp};

const STATUS_RECENT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    pub primary: StoreKind,
    pub dual_write: bool,
    pub fallback_reads: bool,
}

impl RoutingConfig {
    pub fn from_storage(cfg: &StorageConfig) -> Result<Self, UnknownStoreKind> {
        Ok(Self { primary: cfg.primary.parse()?, dual_write: cfg.dual_write, fallback_reads: cfg.fallback_reads })
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { primary: StoreKind::Postgres, dual_write: true, fallback_reads: true }
    }
}

#[derive(Debug, Clone)]
pub enum WriteOperation {
    Create { document: Value },
    Update { id: Uuid, patch: Value },
    Delete { id: Uuid },
}

impl WriteOperation {
    pub fn op(&self) -> WriteOp {
        match self {
            WriteOperation::Create { .. } => WriteOp::Create,
            WriteOperation::Update { .. } => WriteOp::Update,
            WriteOperation::Delete { .. } => WriteOp::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The primary's resulting document.
    Applied(Value),
    Deleted,
    /// Update or delete of an id the primary does not hold.
    Missing,
    /// The primary failed non-critically; the write is queued for replay.
    Deferred(StoreError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub attempted: usize,
    pub resolved: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchReport {
    pub previous: StoreKind,
    pub primary: StoreKind,
    pub sync: SyncReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    pub primary: StoreKind,
    pub secondary: StoreKind,
    pub dual_write: bool,
    pub fallback_reads: bool,
    pub pending_sync_errors: usize,
    pub dropped_sync_errors: u64,
    pub recent_sync_errors: Vec<SyncError>,
    pub recent_operations: Vec<OperationRecord>,
}

pub struct DualWriteStrategy {
    postgres: Arc<dyn DocumentStore>,
    file: Arc<dyn DocumentStore>,
    routing: ArcSwap<RoutingConfig>,
    ledger: SyncLedger,
}

impl DualWriteStrategy {
    pub fn new(
        postgres: Arc<dyn DocumentStore>,
        file: Arc<dyn DocumentStore>,
        routing: RoutingConfig,
        ledger: SyncLedger,
    ) -> Self {
        Self { postgres, file, routing: ArcSwap::from_pointee(routing), ledger }
    }

    /// Build from `[storage]`, spawning the ledger task.
    pub fn from_config(
        postgres: Arc<dyn DocumentStore>,
        file: Arc<dyn DocumentStore>,
        cfg: &StorageConfig,
    ) -> Result<Self, UnknownStoreKind> {
        let routing = RoutingConfig::from_storage(cfg)?;
        Ok(Self::new(postgres, file, routing, SyncLedger::spawn(cfg.max_sync_errors)))
    }

    pub fn routing(&self) -> RoutingConfig {
        **self.routing.load()
    }

    fn store(&self, kind: StoreKind) -> &Arc<dyn DocumentStore> {
        match kind {
            StoreKind::Postgres => &self.postgres,
            StoreKind::File => &self.file,
        }
    }

    #[instrument(skip(self, operation), fields(op = %operation.op()))]
    pub async fn dual_write(&self, collection: &str, mut operation: WriteOperation) -> Result<WriteOutcome, StoreError> {
        let routing = self.routing();
        let op = operation.op();
        let primary = self.store(routing.primary);
        let secondary = self.store(routing.primary.other());

        let id = match &mut operation {
            WriteOperation::Create { document } => ensure_id(document)?,
            WriteOperation::Update { id, .. } | WriteOperation::Delete { id } => *id,
        };

        let primary_result = match &operation {
            WriteOperation::Create { document } => primary.insert(collection, document.clone()).await.map(WriteOutcome::Applied),
            WriteOperation::Update { id, patch } => primary
                .update(collection, *id, patch.clone())
                .await
                .map(|doc| doc.map_or(WriteOutcome::Missing, WriteOutcome::Applied)),
            WriteOperation::Delete { id } => primary
                .delete(collection, *id)
                .await
                .map(|found| if found { WriteOutcome::Deleted } else { WriteOutcome::Missing }),
        };

        let outcome = match primary_result {
            Ok(outcome) => outcome,
            Err(e) if e.is_critical() => {
                DUAL_WRITES_TOTAL.with_label_values(&[op.as_str(), "rejected"]).inc();
                self.log_operation(op, collection, Some(id), routing.primary, false, SecondaryOutcome::Skipped).await;
                return Err(e);
            }
            Err(e) => {
                warn!(collection, %id, store = %routing.primary, error = %e, "primary write failed, deferring");
                DUAL_WRITES_TOTAL.with_label_values(&[op.as_str(), "deferred"]).inc();
                let (document, partial) = match &operation {
                    WriteOperation::Create { document } => (Some(document.clone()), false),
                    WriteOperation::Update { patch, .. } => (Some(patch.clone()), true),
                    WriteOperation::Delete { .. } => (None, false),
                };
                self.record_sync_error(op, collection, id, routing.primary, document, partial, routing.dual_write, &e)
                    .await;
                self.log_operation(op, collection, Some(id), routing.primary, false, SecondaryOutcome::Skipped).await;
                return Ok(WriteOutcome::Deferred(e));
            }
        };

        let secondary_outcome = if !routing.dual_write {
            SecondaryOutcome::Skipped
        } else {
            let mirrored = match (&operation, &outcome) {
                (WriteOperation::Create { .. }, WriteOutcome::Applied(doc)) => {
                    Some(secondary.insert(collection, doc.clone()).await.map(|_| ()))
                }
                (WriteOperation::Update { .. }, WriteOutcome::Applied(doc)) => {
                    Some(secondary.upsert(collection, doc.clone()).await.map(|_| ()))
                }
                (WriteOperation::Delete { id }, _) => Some(secondary.delete(collection, *id).await.map(|_| ())),
                _ => None,
            };
            match mirrored {
                None => SecondaryOutcome::Skipped,
                Some(Ok(())) => SecondaryOutcome::Ok,
                Some(Err(e)) => {
                    warn!(collection, %id, store = %secondary.kind(), error = %e, "secondary write failed, recorded for sync");
                    let document = match &outcome {
                        WriteOutcome::Applied(doc) => Some(doc.clone()),
                        _ => None,
                    };
                    self.record_sync_error(op, collection, id, secondary.kind(), document, false, false, &e).await;
                    SecondaryOutcome::Failed
                }
            }
        };

        let label = match secondary_outcome {
            SecondaryOutcome::Ok => "mirrored",
            SecondaryOutcome::Failed => "secondary_failed",
            SecondaryOutcome::Skipped => "primary_only",
        };
        DUAL_WRITES_TOTAL.with_label_values(&[op.as_str(), label]).inc();
        self.log_operation(op, collection, Some(id), routing.primary, true, secondary_outcome).await;
        Ok(outcome)
    }

    /// Primary read, falling back to the secondary on a miss or a
    /// non-critical failure when fallback reads are enabled.
    pub async fn read(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let routing = self.routing();
        match self.store(routing.primary).get(collection, id).await {
            Ok(Some(doc)) => return Ok(Some(doc)),
            Ok(None) if !routing.fallback_reads => return Ok(None),
            Err(e) if e.is_critical() || !routing.fallback_reads => return Err(e),
            Ok(None) => debug!(collection, %id, "primary miss, reading secondary"),
            Err(e) => warn!(collection, %id, error = %e, "primary read failed, reading secondary"),
        }
        let doc = self.store(routing.primary.other()).get(collection, id).await?;
        if doc.is_some() {
            FALLBACK_READS_TOTAL.inc();
        }
        Ok(doc)
    }

    /// Primary listing; the secondary's when the primary is empty or
    /// fails non-critically and fallback reads are enabled.
    pub async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let routing = self.routing();
        match self.store(routing.primary).list(collection).await {
            Ok(docs) if !docs.is_empty() || !routing.fallback_reads => return Ok(docs),
            Err(e) if e.is_critical() || !routing.fallback_reads => return Err(e),
            Ok(_) => debug!(collection, "primary listing empty, reading secondary"),
            Err(e) => warn!(collection, error = %e, "primary listing failed, reading secondary"),
        }
        let docs = self.store(routing.primary.other()).list(collection).await?;
        if !docs.is_empty() {
            FALLBACK_READS_TOTAL.inc();
        }
        Ok(docs)
    }

    /// Replay every recorded failure against the store that missed it.
    #[instrument(skip(self))]
    pub async fn sync_data_inconsistencies(&self) -> SyncReport {
        let pending = self.ledger.drain().await;
        let mut report = SyncReport { attempted: pending.len(), ..SyncReport::default() };
        for mut entry in pending {
            match self.replay(&mut entry).await {
                Ok(()) => {
                    report.resolved += 1;
                    SYNC_REPLAYS_TOTAL.with_label_values(&["resolved"]).inc();
                }
                Err(e) => {
                    report.failed += 1;
                    SYNC_REPLAYS_TOTAL.with_label_values(&["failed"]).inc();
                    warn!(collection = %entry.collection, id = %entry.id, target = %entry.target, error = %e, "sync replay failed");
                    entry.error = e.to_string();
                    entry.at = Utc::now();
                    self.ledger.record_failure(entry).await;
                }
            }
        }
        info!(attempted = report.attempted, resolved = report.resolved, failed = report.failed, "sync completed");
        report
    }

    /// Apply a recorded write to its target and, for deferred primary
    /// writes, carry the result over to the other store. A failed mirror
    /// leaves `entry` describing only the mirror step.
    async fn replay(&self, entry: &mut SyncError) -> Result<(), StoreError> {
        let applied = self.apply(entry).await?;
        if !entry.mirror {
            return Ok(());
        }
        let other = self.store(entry.target.other());
        let mirrored = match &applied {
            Some(doc) => other.upsert(&entry.collection, doc.clone()).await.map(|_| ()),
            None => other.delete(&entry.collection, entry.id).await.map(|_| ()),
        };
        if let Err(e) = mirrored {
            entry.target = other.kind();
            entry.document = applied;
            entry.partial = false;
            entry.mirror = false;
            return Err(e);
        }
        debug!(collection = %entry.collection, id = %entry.id, store = %other.kind(), "replayed write mirrored");
        Ok(())
    }

    /// The target's resulting document, `None` after a delete.
    async fn apply(&self, entry: &SyncError) -> Result<Option<Value>, StoreError> {
        let store = self.store(entry.target);
        let document = || {
            entry
                .document
                .clone()
                .ok_or_else(|| StoreError::InvalidDocument(format!("no document recorded for {}", entry.id)))
        };
        match entry.op {
            WriteOp::Delete => store.delete(&entry.collection, entry.id).await.map(|_| None),
            WriteOp::Update if entry.partial => match store.update(&entry.collection, entry.id, document()?).await? {
                Some(doc) => Ok(Some(doc)),
                None => Err(StoreError::Backend(format!(
                    "document {} missing from {} store",
                    entry.id, entry.target
                ))),
            },
            WriteOp::Create | WriteOp::Update => {
                let doc = document()?;
                if document_id(&doc)? != entry.id {
                    return Err(StoreError::InvalidId(format!("recorded document does not match {}", entry.id)));
                }
                store.upsert(&entry.collection, doc).await.map(Some)
            }
        }
    }

    /// Flush pending sync errors and make `name` the primary store.
    #[instrument(skip(self))]
    pub async fn switch_primary_database(&self, name: &str) -> Result<SwitchReport, UnknownStoreKind> {
        let target: StoreKind = name.parse()?;
        let previous = self.routing().primary;
        let sync = self.sync_data_inconsistencies().await;
        self.routing.rcu(|r| RoutingConfig { primary: target, ..**r });
        info!(from = %previous, to = %target, "primary store switched");
        Ok(SwitchReport { previous, primary: target, sync })
    }

    pub async fn status(&self) -> StorageStatus {
        let routing = self.routing();
        let snap = self.ledger.snapshot(STATUS_RECENT).await;
        StorageStatus {
            primary: routing.primary,
            secondary: routing.primary.other(),
            dual_write: routing.dual_write,
            fallback_reads: routing.fallback_reads,
            pending_sync_errors: snap.pending_sync_errors,
            dropped_sync_errors: snap.dropped_sync_errors,
            recent_sync_errors: snap.recent_sync_errors,
            recent_operations: snap.recent_operations,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_sync_error(
        &self,
        op: WriteOp,
        collection: &str,
        id: Uuid,
        target: StoreKind,
        document: Option<Value>,
        partial: bool,
        mirror: bool,
        error: &StoreError,
    ) {
        SYNC_ERRORS_TOTAL.with_label_values(&[target.as_str()]).inc();
        self.ledger
            .record_failure(SyncError {
                op,
                collection: collection.to_string(),
                id,
                target,
                document,
                partial,
                mirror,
                error: error.to_string(),
                at: Utc::now(),
            })
            .await;
    }

    async fn log_operation(
        &self,
        op: WriteOp,
        collection: &str,
        id: Option<Uuid>,
        primary: StoreKind,
        primary_ok: bool,
        secondary: SecondaryOutcome,
    ) {
        self.ledger
            .record_operation(OperationRecord {
                op,
                collection: collection.to_string(),
                id,
                primary,
                primary_ok,
                secondary,
                at: Utc::now(),
            })
            .await;
    }
}
