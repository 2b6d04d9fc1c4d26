use async_trait::async_trait;
use chrono::Utc;
use models::document::{ActiveModel, Column, Entity};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use super::{document_id, ensure_id, merge_patch, DocumentStore, StoreError, StoreKind};

/// Documents in the `document` table, bodies stored as JSONB.
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_db_err(e: DbErr, collection: &str, id: Uuid) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        return StoreError::Conflict { collection: collection.to_string(), id };
    }
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    #[instrument(skip(self, document))]
    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value, StoreError> {
        let id = ensure_id(&mut document)?;
        let now = Utc::now().into();
        let am = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id),
            body: Set(document.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        am.insert(&self.db).await.map_err(|e| map_db_err(e, collection, id))?;
        Ok(document)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, collection: &str, id: Uuid, patch: Value) -> Result<Option<Value>, StoreError> {
        let Some(row) = Entity::find_by_id((collection.to_string(), id))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(e, collection, id))?
        else {
            return Ok(None);
        };
        let mut body = row.body.clone();
        merge_patch(&mut body, &patch)?;
        let mut am = row.into_active_model();
        am.body = Set(body.clone());
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(|e| map_db_err(e, collection, id))?;
        Ok(Some(body))
    }

    #[instrument(skip(self, document))]
    async fn upsert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let id = document_id(&document)?;
        let now = Utc::now().into();
        let am = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id),
            body: Set(document.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Entity::insert(am)
            .on_conflict(
                OnConflict::columns([Column::Collection, Column::Id])
                    .update_columns([Column::Body, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(e, collection, id))?;
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let res = Entity::delete_by_id((collection.to_string(), id))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(e, collection, id))?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = Entity::find_by_id((collection.to_string(), id))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(e, collection, id))?;
        Ok(row.map(|r| r.body))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows = Entity::find()
            .filter(Column::Collection.eq(collection))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| map_db_err(e, collection, Uuid::nil()))?;
        Ok(rows.into_iter().map(|r| r.body).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use serde_json::json;

    #[tokio::test]
    async fn seaorm_store_crud() -> Result<(), anyhow::Error> {
        if !models::db::db_tests_enabled() {
            eprintln!("skip: DATABASE_URL not set or SKIP_DB_TESTS set");
            return Ok(());
        }
        let store = SeaOrmDocumentStore::new(get_db().await?);
        let collection = format!("test_{}", Uuid::new_v4().simple());

        let doc = store.insert(&collection, json!({ "title": "Painting" })).await?;
        let id = document_id(&doc)?;
        let dup = store.insert(&collection, doc.clone()).await.unwrap_err();
        assert!(matches!(dup, StoreError::Conflict { .. }));

        let updated = store.update(&collection, id, json!({ "price": 50 })).await?.expect("row");
        assert_eq!(updated["title"], "Painting");
        assert_eq!(updated["price"], 50);

        let mut replaced = updated.clone();
        replaced["title"] = json!("Wall painting");
        store.upsert(&collection, replaced).await?;
        assert_eq!(store.get(&collection, id).await?.expect("row")["title"], "Wall painting");
        assert_eq!(store.list(&collection).await?.len(), 1);

        assert!(store.delete(&collection, id).await?);
        assert!(store.get(&collection, id).await?.is_none());
        Ok(())
    }
}
