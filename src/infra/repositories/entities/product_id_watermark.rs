//! Highest product id ever assigned.
//!
//! A single row (`id = 1`) that only moves forward, so deleting the newest
//! product never frees its id.

use sea_orm::entity::prelude::*;

/// Key of the only row in the table
pub const WATERMARK_ROW: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "product_id_watermarks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub last_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
