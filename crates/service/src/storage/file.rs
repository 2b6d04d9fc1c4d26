use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{
    document_id, ensure_id, json_map_store::JsonMapStore, merge_patch, DocumentStore, StoreError, StoreKind,
};

type Collections = JsonMapStore<String, HashMap<Uuid, Value>>;

/// JSON file mirror: one file holding every collection.
pub struct FileDocumentStore {
    inner: Arc<Collections>,
}

impl FileDocumentStore {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let path = path.into();
        debug!(path = %path.display(), "opening file document store");
        Ok(Self { inner: JsonMapStore::new(path).await? })
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::File
    }

    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value, StoreError> {
        let id = ensure_id(&mut document)?;
        let collection = collection.to_string();
        self.inner
            .update_map(move |map| {
                let coll = map.entry(collection.clone()).or_default();
                if coll.contains_key(&id) {
                    return Err(StoreError::Conflict { collection, id });
                }
                coll.insert(id, document.clone());
                Ok(document)
            })
            .await
    }

    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Option<Value>, StoreError> {
        self.inner
            .update_map(|map| {
                let Some(doc) = map.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
                    return Ok(None);
                };
                merge_patch(doc, &patch)?;
                Ok(Some(doc.clone()))
            })
            .await
    }

    async fn upsert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let id = document_id(&document)?;
        self.inner
            .update_map(|map| {
                map.entry(collection.to_string()).or_default().insert(id, document.clone());
                Ok(document)
            })
            .await
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        self.inner
            .update_map(|map| Ok(map.get_mut(collection).map(|c| c.remove(&id).is_some()).unwrap_or(false)))
            .await
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        Ok(self
            .inner
            .read(&collection.to_string(), |c| c.get(&id).cloned())
            .await
            .flatten())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .inner
            .read(&collection.to_string(), |c| c.values().cloned().collect())
            .await
            .unwrap_or_default())
    }
}
