use std::{marker::PhantomData, sync::Arc};

use chrono::Utc;
use models::{Document, ModelError};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dual_write::{DualWriteStrategy, WriteOperation, WriteOutcome},
    errors::ServiceError,
};

/// Typed access to one collection through the dual-write strategy.
pub struct Repository<T: Document> {
    strategy: Arc<DualWriteStrategy>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { strategy: self.strategy.clone(), _marker: PhantomData }
    }
}

fn decode<T: Document>(value: Value) -> Result<T, ServiceError> {
    serde_json::from_value(value).map_err(|e| ServiceError::Model(ModelError::from(e)))
}

fn encode<T: Document>(doc: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(doc).map_err(|e| ServiceError::Model(ModelError::from(e)))
}

fn deferred(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Unavailable(e.to_string())
}

impl<T: Document> Repository<T> {
    pub fn new(strategy: Arc<DualWriteStrategy>) -> Self {
        Self { strategy, _marker: PhantomData }
    }

    pub async fn insert(&self, mut doc: T) -> Result<T, ServiceError> {
        doc.before_save()?;
        let document = encode(&doc)?;
        match self.strategy.dual_write(T::COLLECTION, WriteOperation::Create { document }).await? {
            WriteOutcome::Applied(v) => decode(v),
            WriteOutcome::Deferred(e) => Err(deferred(e)),
            other => Err(ServiceError::Db(format!("unexpected create outcome {other:?}"))),
        }
    }

    /// Persist the whole document, refreshing `updated_at` and derived fields.
    pub async fn save(&self, mut doc: T) -> Result<T, ServiceError> {
        doc.touch(Utc::now());
        doc.before_save()?;
        let patch = encode(&doc)?;
        match self.strategy.dual_write(T::COLLECTION, WriteOperation::Update { id: doc.id(), patch }).await? {
            WriteOutcome::Applied(v) => decode(v),
            WriteOutcome::Missing => Err(ServiceError::not_found(T::COLLECTION)),
            WriteOutcome::Deferred(e) => Err(deferred(e)),
            WriteOutcome::Deleted => Err(ServiceError::Db("unexpected delete outcome".into())),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        match self.strategy.dual_write(T::COLLECTION, WriteOperation::Delete { id }).await? {
            WriteOutcome::Deleted => Ok(true),
            WriteOutcome::Missing => Ok(false),
            WriteOutcome::Deferred(e) => Err(deferred(e)),
            WriteOutcome::Applied(_) => Ok(true),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>, ServiceError> {
        self.strategy.read(T::COLLECTION, id).await?.map(decode).transpose()
    }

    /// Like `get`, with a not-found error naming `entity`.
    pub async fn find(&self, id: Uuid, entity: &str) -> Result<T, ServiceError> {
        self.get(id).await?.ok_or_else(|| ServiceError::not_found(entity))
    }

    /// Every document in the collection, newest first. Undecodable entries are skipped.
    pub async fn all(&self) -> Result<Vec<T>, ServiceError> {
        let mut docs: Vec<T> = self
            .strategy
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<T>(v) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(collection = T::COLLECTION, error = %e, "skipping undecodable document");
                    None
                }
            })
            .collect();
        docs.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(docs)
    }

    pub async fn find_where<F>(&self, pred: F) -> Result<Vec<T>, ServiceError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().filter(|d| pred(d)).collect())
    }
}
