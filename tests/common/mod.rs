//! Shared fixtures for integration tests: in-memory repositories behind the
//! real services, and a router wired over them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use uuid::Uuid;

use storefront_api::api::{create_router, AppState};
use storefront_api::config::Config;
use storefront_api::domain::{Cart, NewProduct, Product, User};
use storefront_api::errors::{AppError, AppResult};
use storefront_api::infra::{
    CartRepository, Database, ImageStore, ImageUpload, ProductRepository, UnitOfWork,
    UserRepository,
};
use storefront_api::services::{
    Authenticator, CartManager, Catalog, ImageRelay, Services,
};

pub const JWT_SECRET: &str = "integration-test-secret-key-32-chars!!";

#[derive(Default)]
struct ProductRows {
    rows: Vec<Product>,
    high_water: Option<i32>,
}

/// Products that clear their cart lines on removal, like `ProductStore`
pub struct InMemoryProducts {
    state: Mutex<ProductRows>,
    carts: Arc<InMemoryCarts>,
}

impl InMemoryProducts {
    pub fn new(carts: Arc<InMemoryCarts>) -> Self {
        Self {
            state: Mutex::new(ProductRows::default()),
            carts,
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let mut state = self.state.lock().await;
        let current_max = state.rows.iter().map(|p| p.id).max();
        let id = Product::next_id(current_max.max(state.high_water));
        let created = Product {
            id,
            name: product.name,
            image: product.image,
            category: product.category,
            new_price: product.new_price,
            old_price: product.old_price,
            date: Utc::now(),
            available: true,
        };
        state.rows.push(created.clone());
        state.high_water = Some(id);
        Ok(created)
    }

    async fn delete(&self, id: i32) -> AppResult<Option<Product>> {
        let mut state = self.state.lock().await;
        let Some(index) = state.rows.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        self.carts.forget_product(id).await;
        Ok(Some(state.rows.remove(index)))
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let mut rows = self.state.lock().await.rows.clone();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    async fn list_newest(&self, limit: u64) -> AppResult<Vec<Product>> {
        let mut rows = self.state.lock().await.rows.clone();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn list_by_category(&self, category: &str, limit: u64) -> AppResult<Vec<Product>> {
        let mut rows: Vec<Product> = self
            .state
            .lock()
            .await
            .rows
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.rows.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, name: String, email: String, password_hash: String) -> AppResult<User> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|u| u.email == email) {
            return Err(AppError::DuplicateUser);
        }
        let user = User::new(name, email, password_hash);
        rows.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryCarts {
    carts: Mutex<HashMap<Uuid, Cart>>,
}

impl InMemoryCarts {
    async fn forget_product(&self, product_id: i32) {
        for cart in self.carts.lock().await.values_mut() {
            cart.set(product_id, 0);
        }
    }
}

#[async_trait]
impl CartRepository for InMemoryCarts {
    async fn get(&self, user_id: Uuid) -> AppResult<Cart> {
        Ok(self
            .carts
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn increment(&self, user_id: Uuid, product_id: i32) -> AppResult<u32> {
        Ok(self
            .carts
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .increment(product_id))
    }

    async fn decrement(&self, user_id: Uuid, product_id: i32) -> AppResult<u32> {
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();
        cart.decrement(product_id);
        Ok(cart.quantity(product_id))
    }
}

/// Unit of Work over the in-memory repositories
pub struct InMemoryStore {
    pub products: Arc<InMemoryProducts>,
    pub users: Arc<InMemoryUsers>,
    pub carts: Arc<InMemoryCarts>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        let carts = Arc::new(InMemoryCarts::default());
        Self {
            products: Arc::new(InMemoryProducts::new(carts.clone())),
            users: Arc::default(),
            carts,
        }
    }
}

impl UnitOfWork for InMemoryStore {
    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }
}

/// Image host that records uploads and can be told to fail
#[derive(Default)]
pub struct FakeImageStore {
    pub uploads: Mutex<Vec<ImageUpload>>,
    pub fail: AtomicBool,
}

impl FakeImageStore {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(&self, upload: ImageUpload) -> AppResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::upstream("rejected by fake host"));
        }
        let url = format!("https://img.test/{}", upload.public_id);
        self.uploads.lock().await.push(upload);
        Ok(url)
    }
}

pub fn test_config() -> Config {
    Config::new("postgres://unused", JWT_SECRET)
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub images: Arc<FakeImageStore>,
}

/// Router over fresh in-memory state and a working image host
pub fn test_app() -> TestApp {
    test_app_with_images(FakeImageStore::default())
}

pub fn test_app_with_images(images: FakeImageStore) -> TestApp {
    let store = Arc::new(InMemoryStore::default());
    let images = Arc::new(images);

    let services = Services::new(
        Arc::new(Authenticator::new(store.clone(), test_config())),
        Arc::new(Catalog::new(store.clone())),
        Arc::new(CartManager::new(store.clone())),
        Arc::new(ImageRelay::new(images.clone())),
    );
    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));

    TestApp {
        router: create_router(AppState::from_container(&services, database)),
        store,
        images,
    }
}
