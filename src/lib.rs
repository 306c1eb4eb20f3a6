//! Storefront API - catalog, accounts, carts and image uploads for a
//! small online shop, plus a typed client that mirrors shop state.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve` and `migrate`
//! - **config**: environment configuration and constants
//! - **domain**: products, users, carts and password hashing
//! - **services**: use cases behind traits
//! - **infra**: database, repositories and the image host
//! - **api**: HTTP handlers, middleware, and routes
//! - **client**: HTTP client and shared shop state
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! storefront serve --port 4000
//! storefront migrate status
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

pub use api::AppState;
pub use config::Config;
pub use domain::{Cart, Password, Product, User};
pub use errors::{AppError, AppResult};
