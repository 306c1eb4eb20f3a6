//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through one container so the router only
//! carries a single piece of shared state.

use std::sync::Arc;

use super::{AuthService, CartService, ProductService, UploadService};
use crate::config::Config;
use crate::infra::{CloudinaryStore, ImageStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn uploads(&self) -> Arc<dyn UploadService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    product_service: Arc<dyn ProductService>,
    cart_service: Arc<dyn CartService>,
    upload_service: Arc<dyn UploadService>,
}

impl Services {
    /// Create a container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        product_service: Arc<dyn ProductService>,
        cart_service: Arc<dyn CartService>,
        upload_service: Arc<dyn UploadService>,
    ) -> Self {
        Self {
            auth_service,
            product_service,
            cart_service,
            upload_service,
        }
    }

    /// Wire every service over a database connection and the configured
    /// image host
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let store: Arc<dyn ImageStore> =
            Arc::new(CloudinaryStore::new(config.image_store.clone()));
        Self::with_image_store(db, config, store)
    }

    /// Same as `from_connection` but with a caller-provided image host
    pub fn with_image_store(
        db: sea_orm::DatabaseConnection,
        config: Config,
        store: Arc<dyn ImageStore>,
    ) -> Self {
        use super::{Authenticator, CartManager, Catalog, ImageRelay};

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            product_service: Arc::new(Catalog::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow)),
            upload_service: Arc::new(ImageRelay::new(store)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn uploads(&self) -> Arc<dyn UploadService> {
        self.upload_service.clone()
    }
}
