//! Unit of Work pattern implementation.
//!
//! Centralizes access to the repositories so services depend on one
//! handle instead of wiring each store individually. Operations that need
//! several statements to be atomic (product id assignment) own their
//! transaction inside the repository.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    CartRepository, CartStore, ProductRepository, ProductStore, UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UnitOfWork: Send + Sync {
    fn products(&self) -> Arc<dyn ProductRepository>;

    fn users(&self) -> Arc<dyn UserRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;
}

/// Concrete implementation of UnitOfWork backed by one connection pool
pub struct Persistence {
    product_repo: Arc<ProductStore>,
    user_repo: Arc<UserStore>,
    cart_repo: Arc<CartStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            product_repo: Arc::new(ProductStore::new(db.clone())),
            user_repo: Arc::new(UserStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }
}
