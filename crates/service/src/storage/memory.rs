use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::{document_id, ensure_id, merge_patch, DocumentStore, StoreError, StoreKind};

/// In-process store used by tests and as a stand-in for either slot.
/// `set_unavailable(true)` makes every call fail with `StoreError::Unavailable`.
pub struct MemoryDocumentStore {
    kind: StoreKind,
    collections: DashMap<String, HashMap<Uuid, Value>>,
    unavailable: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new(kind: StoreKind) -> Self {
        Self { kind, collections: DashMap::new(), unavailable: AtomicBool::new(false) }
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} store is down", self.kind)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value, StoreError> {
        self.check()?;
        let id = ensure_id(&mut document)?;
        let mut coll = self.collections.entry(collection.to_string()).or_default();
        if coll.contains_key(&id) {
            return Err(StoreError::Conflict { collection: collection.to_string(), id });
        }
        coll.insert(id, document.clone());
        Ok(document)
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Option<Value>, StoreError> {
        self.check()?;
        let Some(mut coll) = self.collections.get_mut(collection) else { return Ok(None) };
        let Some(doc) = coll.get_mut(&id) else { return Ok(None) };
        let mut next = doc.clone();
        merge_patch(&mut next, &patch)?;
        *doc = next.clone();
        Ok(Some(next))
    }

    async fn upsert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        self.check()?;
        let id = document_id(&document)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self
            .collections
            .get_mut(collection)
            .map(|mut c| c.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        self.check()?;
        Ok(self.collections.get(collection).and_then(|c| c.get(&id).cloned()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.check()?;
        Ok(self
            .collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }
}
