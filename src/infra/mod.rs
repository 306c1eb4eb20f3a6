//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Remote image hosting
//! - Unit of Work handing out repositories

pub mod db;
pub mod image_store;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use image_store::{CloudinaryStore, ImageStore, ImageUpload};
pub use repositories::{
    CartRepository, CartStore, ProductRepository, ProductStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use image_store::MockImageStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockCartRepository, MockProductRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
