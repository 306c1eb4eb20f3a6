//! Cart repository implementation.
//!
//! Quantities change through single-statement upserts and conditional
//! updates, so concurrent requests for the same user never lose updates.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::cart_item::{self, ActiveModel, Entity as CartItemEntity};
use crate::domain::Cart;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load the user's cart
    async fn get(&self, user_id: Uuid) -> AppResult<Cart>;

    /// Add one unit of a product, returning the new quantity
    async fn increment(&self, user_id: Uuid, product_id: i32) -> AppResult<u32>;

    /// Remove one unit of a product if any is held, returning the new quantity
    async fn decrement(&self, user_id: Uuid, product_id: i32) -> AppResult<u32>;
}

/// Concrete implementation of CartRepository
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_quantity(stored: i32) -> u32 {
    u32::try_from(stored).unwrap_or(0)
}

#[async_trait]
impl CartRepository for CartStore {
    async fn get(&self, user_id: Uuid) -> AppResult<Cart> {
        let rows = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::ProductId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.product_id, to_quantity(row.quantity)))
            .collect())
    }

    async fn increment(&self, user_id: Uuid, product_id: i32) -> AppResult<u32> {
        let line = ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(1),
            updated_at: Set(chrono::Utc::now()),
        };

        let model = CartItemEntity::insert(line)
            .on_conflict(
                OnConflict::columns([cart_item::Column::UserId, cart_item::Column::ProductId])
                    .value(
                        cart_item::Column::Quantity,
                        Expr::col((CartItemEntity, cart_item::Column::Quantity)).add(1),
                    )
                    .update_column(cart_item::Column::UpdatedAt)
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Ok(to_quantity(model.quantity))
    }

    async fn decrement(&self, user_id: Uuid, product_id: i32) -> AppResult<u32> {
        let updated = CartItemEntity::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).sub(1),
            )
            .col_expr(cart_item::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .filter(cart_item::Column::Quantity.gt(0))
            .exec_with_returning(&self.db)
            .await?;

        let remaining = updated.first().map_or(0, |row| to_quantity(row.quantity));

        if remaining == 0 {
            CartItemEntity::delete_many()
                .filter(cart_item::Column::UserId.eq(user_id))
                .filter(cart_item::Column::ProductId.eq(product_id))
                .filter(cart_item::Column::Quantity.lte(0))
                .exec(&self.db)
                .await?;
        }

        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn line(user_id: Uuid, product_id: i32, quantity: i32) -> cart_item::Model {
        cart_item::Model {
            user_id,
            product_id,
            quantity,
            updated_at: chrono::Utc::now(),
        }
    }

    fn logged_sql(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|s| s.sql.clone()))
            .collect()
    }

    #[test]
    fn test_negative_stored_quantity_reads_as_zero() {
        assert_eq!(to_quantity(-1), 0);
        assert_eq!(to_quantity(0), 0);
        assert_eq!(to_quantity(5), 5);
    }

    #[tokio::test]
    async fn test_increment_is_a_single_upsert() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[line(user_id, 7, 3)]])
            .into_connection();
        let store = CartStore::new(db);

        assert_eq!(store.increment(user_id, 7).await.unwrap(), 3);

        let sql = logged_sql(store.db);
        assert_eq!(sql.len(), 1);
        assert!(sql[0].starts_with(r#"INSERT INTO "cart_items""#));
        assert!(sql[0].contains(r#"ON CONFLICT ("user_id", "product_id") DO UPDATE"#));
        assert!(sql[0].contains(r#""quantity" +"#));
        assert!(sql[0].contains("RETURNING"));
    }

    #[tokio::test]
    async fn test_decrement_only_touches_positive_quantities() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[line(user_id, 7, 1)]])
            .into_connection();
        let store = CartStore::new(db);

        assert_eq!(store.decrement(user_id, 7).await.unwrap(), 1);

        let sql = logged_sql(store.db);
        assert_eq!(sql.len(), 1);
        assert!(sql[0].starts_with(r#"UPDATE "cart_items""#));
        assert!(sql[0].contains(r#""quantity" -"#));
        assert!(sql[0].contains(r#""cart_items"."quantity" > "#));
    }

    #[tokio::test]
    async fn test_decrement_to_zero_deletes_the_line() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[line(user_id, 7, 0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let store = CartStore::new(db);

        assert_eq!(store.decrement(user_id, 7).await.unwrap(), 0);

        let sql = logged_sql(store.db);
        assert_eq!(sql.len(), 2);
        assert!(sql[1].starts_with(r#"DELETE FROM "cart_items""#));
    }

    #[tokio::test]
    async fn test_decrement_of_missing_line_stays_zero() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cart_item::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = CartStore::new(db);

        assert_eq!(store.decrement(user_id, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_reads_sparse_lines() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![line(user_id, 2, 1), line(user_id, 9, 4)]])
            .into_connection();
        let store = CartStore::new(db);

        let cart = store.get(user_id).await.unwrap();
        assert_eq!(cart.quantity(2), 1);
        assert_eq!(cart.quantity(9), 4);
        assert_eq!(cart.quantity(5), 0);
    }
}
