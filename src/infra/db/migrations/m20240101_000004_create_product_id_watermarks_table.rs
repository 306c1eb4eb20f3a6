//! Migration: Create product_id_watermarks table.
//!
//! Also indexes cart lines by product so removing a product can clear them.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_cart_items_table::CartItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductIdWatermarks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductIdWatermarks::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductIdWatermarks::LastId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Start from whatever the catalog already holds
        manager
            .get_connection()
            .execute_unprepared(
                "INSERT INTO product_id_watermarks (id, last_id) \
                 SELECT 1, COALESCE(MAX(id), 0) FROM products \
                 ON CONFLICT (id) DO NOTHING",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_items_product")
                    .table(CartItems::Table)
                    .col(CartItems::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_cart_items_product")
                    .table(CartItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ProductIdWatermarks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProductIdWatermarks {
    Table,
    Id,
    LastId,
}
