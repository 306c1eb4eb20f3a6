//! Domain layer - Core business entities and logic
//!
//! Catalog products, shopper accounts, carts, and the password value
//! object. Nothing here touches the database or HTTP.

pub mod cart;
pub mod password;
pub mod product;
pub mod user;

pub use cart::Cart;
pub use password::Password;
pub use product::{NewProduct, Product};
pub use user::User;
