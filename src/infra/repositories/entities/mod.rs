//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod cart_item;
pub mod product;
pub mod product_id_watermark;
pub mod user;
