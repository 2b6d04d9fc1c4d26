use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_document::Document;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing: newest first within a collection
        manager
            .create_index(
                Index::create()
                    .name("idx_document_collection_created")
                    .table(Document::Table)
                    .col(Document::Collection)
                    .col(Document::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_document_collection_created")
                    .table(Document::Table)
                    .to_owned(),
            )
            .await
    }
}
