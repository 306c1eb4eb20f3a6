//! Product repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use super::entities::product_id_watermark::{
    self as watermark, Entity as WatermarkEntity, WATERMARK_ROW,
};
use crate::domain::{NewProduct, Product};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
///
/// Every listing carries an explicit ordering; nothing relies on the
/// database's natural row order.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product under the next id: one past the highest id ever assigned
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    /// Delete a product by id and clear it from every cart, returning it if it existed
    async fn delete(&self, id: i32) -> AppResult<Option<Product>>;

    /// List every product by ascending id
    async fn list(&self) -> AppResult<Vec<Product>>;

    /// List the most recently created products, newest first
    async fn list_newest(&self, limit: u64) -> AppResult<Vec<Product>>;

    /// List the first products of a category by ascending id
    async fn list_by_category(&self, category: &str, limit: u64) -> AppResult<Vec<Product>>;
}

/// Concrete implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Blocks other writers on `products` until the transaction ends; reads go on.
const LOCK_PRODUCTS: &str = "LOCK TABLE products IN EXCLUSIVE MODE";

/// Commit on success, roll back on failure.
async fn finish<T>(txn: DatabaseTransaction, result: Result<T, DbErr>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e.into())
        }
    }
}

/// Assign the next id and insert under the table lock.
///
/// The id follows both the current maximum and the recorded high-water
/// mark, so ids freed by deletion are never handed out again.
async fn insert_next(
    txn: &DatabaseTransaction,
    product: NewProduct,
) -> Result<product::Model, DbErr> {
    txn.execute_unprepared(LOCK_PRODUCTS).await?;

    let current_max: Option<i32> = ProductEntity::find()
        .select_only()
        .column_as(product::Column::Id.max(), "max_id")
        .into_tuple::<Option<i32>>()
        .one(txn)
        .await?
        .flatten();

    let high_water = WatermarkEntity::find_by_id(WATERMARK_ROW)
        .one(txn)
        .await?
        .map(|row| row.last_id);

    let id = Product::next_id(current_max.max(high_water));

    let model = ActiveModel {
        id: Set(id),
        name: Set(product.name),
        image: Set(product.image),
        category: Set(product.category),
        new_price: Set(product.new_price),
        old_price: Set(product.old_price),
        date: Set(chrono::Utc::now()),
        available: Set(true),
    }
    .insert(txn)
    .await?;

    WatermarkEntity::insert(watermark::ActiveModel {
        id: Set(WATERMARK_ROW),
        last_id: Set(id),
    })
    .on_conflict(
        OnConflict::column(watermark::Column::Id)
            .update_column(watermark::Column::LastId)
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;

    Ok(model)
}

/// Remove the product and every cart line pointing at it.
async fn delete_with_cart_lines(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<Option<product::Model>, DbErr> {
    let Some(existing) = ProductEntity::find_by_id(id).one(txn).await? else {
        return Ok(None);
    };

    CartItemEntity::delete_many()
        .filter(cart_item::Column::ProductId.eq(id))
        .exec(txn)
        .await?;
    ProductEntity::delete_by_id(id).exec(txn).await?;

    Ok(Some(existing))
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let txn = self.db.begin().await?;
        let result = insert_next(&txn, product).await;
        finish(txn, result).await.map(Product::from)
    }

    async fn delete(&self, id: i32) -> AppResult<Option<Product>> {
        let txn = self.db.begin().await?;
        let result = delete_with_cart_lines(&txn, id).await;
        Ok(finish(txn, result).await?.map(Product::from))
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_newest(&self, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_desc(product::Column::Date)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_by_category(&self, category: &str, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Category.eq(category))
            .order_by_asc(product::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn model(id: i32) -> product::Model {
        product::Model {
            id,
            name: format!("Item {id}"),
            image: format!("https://img.test/{id}.png"),
            category: "women".to_string(),
            new_price: Decimal::new(5000, 2),
            old_price: Decimal::new(8050, 2),
            date: chrono::Utc::now(),
            available: true,
        }
    }

    fn max_row(max: Option<i32>) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("max_id", Value::Int(max))])
    }

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Item".to_string(),
            image: "https://img.test/item.png".to_string(),
            category: "women".to_string(),
            new_price: Decimal::new(5000, 2),
            old_price: Decimal::new(8050, 2),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn logged_statements(db: DatabaseConnection) -> Vec<sea_orm::Statement> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().to_vec())
            .collect()
    }

    fn binds(statement: &sea_orm::Statement, value: Value) -> bool {
        statement
            .values
            .as_ref()
            .is_some_and(|values| values.0.contains(&value))
    }

    #[tokio::test]
    async fn test_create_locks_table_and_skips_past_high_water_mark() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .append_query_results([[max_row(Some(12))]])
            .append_query_results([[watermark::Model {
                id: WATERMARK_ROW,
                last_id: 14,
            }]])
            .append_query_results([[model(15)]])
            .append_exec_results([exec_ok()])
            .into_connection();
        let store = ProductStore::new(db);

        let created = store.create(new_product()).await.unwrap();
        assert_eq!(created.id, 15);

        let statements = logged_statements(store.db);
        let sql: Vec<&str> = statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(sql.first(), Some(&"BEGIN"));
        assert_eq!(sql[1], LOCK_PRODUCTS);
        assert_eq!(sql.last(), Some(&"COMMIT"));

        let product_insert = statements
            .iter()
            .find(|s| s.sql.starts_with(r#"INSERT INTO "products""#))
            .unwrap();
        assert!(binds(product_insert, Value::Int(Some(15))));

        let watermark_upsert = statements
            .iter()
            .find(|s| s.sql.starts_with(r#"INSERT INTO "product_id_watermarks""#))
            .unwrap();
        assert!(watermark_upsert.sql.contains("ON CONFLICT"));
        assert!(binds(watermark_upsert, Value::Int(Some(15))));
    }

    #[tokio::test]
    async fn test_create_in_empty_catalog_starts_at_one() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .append_query_results([[max_row(None)]])
            .append_query_results([Vec::<watermark::Model>::new()])
            .append_query_results([[model(1)]])
            .append_exec_results([exec_ok()])
            .into_connection();
        let store = ProductStore::new(db);

        store.create(new_product()).await.unwrap();

        let statements = logged_statements(store.db);
        let product_insert = statements
            .iter()
            .find(|s| s.sql.starts_with(r#"INSERT INTO "products""#))
            .unwrap();
        assert!(binds(product_insert, Value::Int(Some(1))));
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .append_query_results([[max_row(Some(3))]])
            .append_query_results([Vec::<watermark::Model>::new()])
            .append_query_errors([DbErr::Custom("numeric field overflow".to_string())])
            .into_connection();
        let store = ProductStore::new(db);

        let result = store.create(new_product()).await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let statements = logged_statements(store.db);
        assert!(!statements.iter().any(|s| s.sql == "COMMIT"));
        assert!(!statements
            .iter()
            .any(|s| s.sql.starts_with(r#"INSERT INTO "product_id_watermarks""#)));
    }

    #[tokio::test]
    async fn test_delete_clears_cart_lines_before_product() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[model(12)]])
            .append_exec_results([exec_ok(), exec_ok()])
            .into_connection();
        let store = ProductStore::new(db);

        let removed = store.delete(12).await.unwrap();
        assert_eq!(removed.map(|p| p.id), Some(12));

        let statements = logged_statements(store.db);
        let position = |prefix: &str| statements.iter().position(|s| s.sql.starts_with(prefix));
        let carts = position(r#"DELETE FROM "cart_items""#).unwrap();
        let products = position(r#"DELETE FROM "products""#).unwrap();
        assert!(carts < products);
        assert!(binds(&statements[carts], Value::Int(Some(12))));
        assert_eq!(statements.last().map(|s| s.sql.as_str()), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_delete_missing_product_touches_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let store = ProductStore::new(db);

        assert!(store.delete(99).await.unwrap().is_none());

        let statements = logged_statements(store.db);
        assert!(!statements.iter().any(|s| s.sql.starts_with("DELETE")));
    }

    #[tokio::test]
    async fn test_list_newest_orders_by_date_then_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(2), model(1)]])
            .into_connection();
        let store = ProductStore::new(db);

        let newest = store.list_newest(8).await.unwrap();
        assert_eq!(newest.len(), 2);

        let statements = logged_statements(store.db);
        assert!(statements[0]
            .sql
            .contains(r#"ORDER BY "products"."date" DESC, "products"."id" DESC LIMIT"#));
    }

    #[tokio::test]
    async fn test_list_by_category_filters_and_orders_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1)]])
            .into_connection();
        let store = ProductStore::new(db);

        store.list_by_category("women", 4).await.unwrap();

        let statements = logged_statements(store.db);
        assert!(statements[0].sql.contains(r#"WHERE "products"."category" = $1"#));
        assert!(statements[0].sql.contains(r#"ORDER BY "products"."id" ASC"#));
        assert!(binds(&statements[0], Value::String(Some(Box::new("women".to_string())))));
    }
}
