//! Sync ledger: a single task owning the failed-write queue and the
//! operation log. Producers talk to it through a bounded channel.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::StoreKind;

pub const CHANNEL_CAPACITY: usize = 256;
pub const MAX_OPERATIONS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl WriteOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        }
    }
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write that reached one store but not the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub op: WriteOp,
    pub collection: String,
    pub id: Uuid,
    /// Store that missed the write.
    pub target: StoreKind,
    /// Full document, or only the patch when `partial` is set.
    pub document: Option<Value>,
    pub partial: bool,
    /// Replay must also carry the result over to the other store.
    pub mirror: bool,
    pub error: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryOutcome {
    Ok,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub op: WriteOp,
    pub collection: String,
    pub id: Option<Uuid>,
    pub primary: StoreKind,
    pub primary_ok: bool,
    pub secondary: SecondaryOutcome,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub pending_sync_errors: usize,
    pub dropped_sync_errors: u64,
    pub recent_sync_errors: Vec<SyncError>,
    pub recent_operations: Vec<OperationRecord>,
}

#[derive(Debug)]
enum LedgerCommand {
    Operation(OperationRecord),
    Failure(SyncError),
    Drain { respond_to: oneshot::Sender<Vec<SyncError>> },
    Snapshot { recent: usize, respond_to: oneshot::Sender<LedgerSnapshot> },
}

struct LedgerActor {
    receiver: mpsc::Receiver<LedgerCommand>,
    sync_errors: VecDeque<SyncError>,
    operations: VecDeque<OperationRecord>,
    max_sync_errors: usize,
    dropped: u64,
}

impl LedgerActor {
    async fn run(mut self) {
        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LedgerCommand::Operation(record) => {
                    if self.operations.len() == MAX_OPERATIONS {
                        self.operations.pop_front();
                    }
                    self.operations.push_back(record);
                }
                LedgerCommand::Failure(err) => {
                    if self.sync_errors.len() >= self.max_sync_errors {
                        if let Some(oldest) = self.sync_errors.pop_front() {
                            self.dropped += 1;
                            warn!(collection = %oldest.collection, id = %oldest.id, "sync ledger full, dropping oldest entry");
                        }
                    }
                    self.sync_errors.push_back(err);
                }
                LedgerCommand::Drain { respond_to } => {
                    let drained: Vec<SyncError> = self.sync_errors.drain(..).collect();
                    debug!(count = drained.len(), "sync ledger drained");
                    let _ = respond_to.send(drained);
                }
                LedgerCommand::Snapshot { recent, respond_to } => {
                    let snapshot = LedgerSnapshot {
                        pending_sync_errors: self.sync_errors.len(),
                        dropped_sync_errors: self.dropped,
                        recent_sync_errors: self.sync_errors.iter().rev().take(recent).cloned().collect(),
                        recent_operations: self.operations.iter().rev().take(recent).cloned().collect(),
                    };
                    let _ = respond_to.send(snapshot);
                }
            }
        }
        debug!("sync ledger stopped");
    }
}

/// Handle to the ledger task. Cheap to clone.
#[derive(Clone)]
pub struct SyncLedger {
    sender: mpsc::Sender<LedgerCommand>,
}

impl SyncLedger {
    /// Spawn the ledger task on the current runtime.
    pub fn spawn(max_sync_errors: usize) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let actor = LedgerActor {
            receiver,
            sync_errors: VecDeque::new(),
            operations: VecDeque::new(),
            max_sync_errors: max_sync_errors.max(1),
            dropped: 0,
        };
        tokio::spawn(actor.run());
        Self { sender }
    }

    async fn send(&self, cmd: LedgerCommand) {
        if self.sender.send(cmd).await.is_err() {
            warn!("sync ledger task is gone, entry lost");
        }
    }

    pub async fn record_operation(&self, record: OperationRecord) {
        self.send(LedgerCommand::Operation(record)).await;
    }

    pub async fn record_failure(&self, err: SyncError) {
        self.send(LedgerCommand::Failure(err)).await;
    }

    /// Remove and return every pending sync error, oldest first.
    pub async fn drain(&self) -> Vec<SyncError> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::Drain { respond_to: tx }).await;
        rx.await.unwrap_or_default()
    }

    /// Counts plus the `recent` newest entries of each log, newest first.
    pub async fn snapshot(&self, recent: usize) -> LedgerSnapshot {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::Snapshot { recent, respond_to: tx }).await;
        rx.await.unwrap_or_default()
    }
}
