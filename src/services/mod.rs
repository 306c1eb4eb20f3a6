//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion and reach repositories through the Unit of Work.

mod auth_service;
mod cart_service;
pub mod container;
mod product_service;
mod upload_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, AuthSession, Authenticator, Claims, ClaimsUser};
pub use cart_service::{CartManager, CartService};
pub use product_service::{Catalog, ProductService};
pub use upload_service::{ImageRelay, UploadService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_service::MockCartService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use product_service::MockProductService;
#[cfg(any(test, feature = "test-utils"))]
pub use upload_service::MockUploadService;
