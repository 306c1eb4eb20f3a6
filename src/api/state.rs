//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, CartService, ProductService, ServiceContainer, Services, UploadService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub product_service: Arc<dyn ProductService>,
    pub cart_service: Arc<dyn CartService>,
    pub upload_service: Arc<dyn UploadService>,
    /// Used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Build state with services wired over the database and the
    /// configured image host.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Build state from any service container.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: container.auth(),
            product_service: container.products(),
            cart_service: container.carts(),
            upload_service: container.uploads(),
            database,
        }
    }
}
