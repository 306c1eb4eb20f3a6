//! Catalog service - product creation, removal and listings.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{NEW_COLLECTION_SIZE, POPULAR_IN_CATEGORY_SIZE};
use crate::domain::{NewProduct, Product};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Persist a product under the next free id
    async fn add_product(&self, product: NewProduct) -> AppResult<Product>;

    /// Delete by id, returning the removed record if there was one
    async fn remove_product(&self, id: i32) -> AppResult<Option<Product>>;

    /// Every product ordered by id
    async fn list_all(&self) -> AppResult<Vec<Product>>;

    /// Most recently created products, newest first
    async fn list_newest(&self) -> AppResult<Vec<Product>>;

    /// First products in a category by id
    async fn list_popular_in_category(&self, category: &str) -> AppResult<Vec<Product>>;
}

/// Concrete implementation of ProductService
pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Catalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for Catalog<U> {
    async fn add_product(&self, product: NewProduct) -> AppResult<Product> {
        let created = self.uow.products().create(product).await?;
        tracing::info!(product_id = created.id, name = %created.name, "Product added");
        Ok(created)
    }

    async fn remove_product(&self, id: i32) -> AppResult<Option<Product>> {
        let removed = self.uow.products().delete(id).await?;
        match &removed {
            Some(product) => tracing::info!(product_id = id, name = %product.name, "Product removed"),
            None => tracing::debug!(product_id = id, "Remove requested for unknown product"),
        }
        Ok(removed)
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list().await
    }

    async fn list_newest(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list_newest(NEW_COLLECTION_SIZE).await
    }

    async fn list_popular_in_category(&self, category: &str) -> AppResult<Vec<Product>> {
        self.uow
            .products()
            .list_by_category(category, POPULAR_IN_CATEGORY_SIZE)
            .await
    }
}
