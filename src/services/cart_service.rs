//! Cart service - per-user quantities keyed by product id.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Cart;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartService: Send + Sync {
    /// Add one unit, returning the new quantity
    async fn add_to_cart(&self, user_id: Uuid, item_id: i32) -> AppResult<u32>;

    /// Remove one unit (never below zero), returning the new quantity
    async fn remove_from_cart(&self, user_id: Uuid, item_id: i32) -> AppResult<u32>;

    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart>;
}

/// Concrete implementation of CartService
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn add_to_cart(&self, user_id: Uuid, item_id: i32) -> AppResult<u32> {
        let quantity = self.uow.carts().increment(user_id, item_id).await?;
        tracing::debug!(%user_id, item_id, quantity, "Cart item added");
        Ok(quantity)
    }

    async fn remove_from_cart(&self, user_id: Uuid, item_id: i32) -> AppResult<u32> {
        let quantity = self.uow.carts().decrement(user_id, item_id).await?;
        tracing::debug!(%user_id, item_id, quantity, "Cart item removed");
        Ok(quantity)
    }

    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        self.uow.carts().get(user_id).await
    }
}
