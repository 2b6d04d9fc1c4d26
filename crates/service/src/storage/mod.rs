//! Document stores behind a common trait.
//!
//! Every store keeps JSON documents grouped by collection and keyed by the
//! document's `id` field. The dual-write strategy places one store in the
//! primary slot and another in the secondary slot.

pub mod json_map_store;
pub mod memory;
pub mod file;
pub mod postgres;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use postgres::SeaOrmDocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    File,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::File => "file",
        }
    }

    /// The store in the opposite slot.
    pub fn other(&self) -> StoreKind {
        match self {
            StoreKind::Postgres => StoreKind::File,
            StoreKind::File => StoreKind::Postgres,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown store '{0}', expected one of: postgres, file")]
pub struct UnknownStoreKind(pub String);

impl FromStr for StoreKind {
    type Err = UnknownStoreKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreKind::Postgres),
            "file" => Ok(StoreKind::File),
            _ => Err(UnknownStoreKind(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("document {id} already exists in {collection}")]
    Conflict { collection: String, id: Uuid },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Critical errors are caused by the request itself and would fail on
    /// any backend; they are returned to the caller instead of deferred.
    pub fn is_critical(&self) -> bool {
        matches!(self, StoreError::InvalidDocument(_) | StoreError::InvalidId(_) | StoreError::Conflict { .. })
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Insert a new document, assigning an `id` when missing.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    /// Shallow-merge `patch` into an existing document. `None` when absent.
    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Option<Value>, StoreError>;

    /// Insert or replace the whole document.
    async fn upsert(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}

/// Read the document's `id` field.
pub fn document_id(document: &Value) -> Result<Uuid, StoreError> {
    let raw = document
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidId("document has no string id".into()))?;
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Return the document's id, generating one when the field is absent or null.
pub fn ensure_id(document: &mut Value) -> Result<Uuid, StoreError> {
    let obj = document
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".into()))?;
    match obj.get("id") {
        None | Some(Value::Null) => {
            let id = Uuid::new_v4();
            obj.insert("id".into(), Value::String(id.to_string()));
            Ok(id)
        }
        Some(_) => document_id(document),
    }
}

/// Shallow merge of top-level fields. The `id` field is never overwritten.
pub fn merge_patch(target: &mut Value, patch: &Value) -> Result<(), StoreError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("patch must be a JSON object".into()))?;
    let target = target
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("stored document is not a JSON object".into()))?;
    for (k, v) in patch {
        if k != "id" {
            target.insert(k.clone(), v.clone());
        }
    }
    Ok(())
}
