//! Storefront client: typed HTTP access to the API and the shared shop
//! state built on top of it.

mod api;
mod context;

pub use api::{ClientError, ClientResult, HttpShopApi, ShopApi};
pub use context::ShopContext;

#[cfg(any(test, feature = "test-utils"))]
pub use api::MockShopApi;
