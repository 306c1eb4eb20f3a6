//! API layer - HTTP surface of the storefront.
//!
//! Handlers stay thin: they validate input, call a service from
//! `AppState` and shape the JSON the storefront client expects.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
