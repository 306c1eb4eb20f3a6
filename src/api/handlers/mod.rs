//! HTTP request handlers.

pub mod auth_handler;
pub mod cart_handler;
pub mod product_handler;
pub mod upload_handler;

pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use product_handler::product_routes;
pub use upload_handler::upload_routes;
