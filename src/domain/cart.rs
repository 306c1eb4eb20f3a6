//! Shopping cart value type.
//!
//! A cart is a sparse map from product id to quantity. Absent ids mean
//! quantity zero, so the map never holds zero or negative entries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Product;

/// Per-user cart keyed by product id.
///
/// Serializes as a JSON object, e.g. `{"1": 2, "5": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Cart(BTreeMap<i32, u32>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity held for a product (zero when absent).
    pub fn quantity(&self, product_id: i32) -> u32 {
        self.0.get(&product_id).copied().unwrap_or(0)
    }

    /// Add one unit of a product, returning the new quantity.
    pub fn increment(&mut self, product_id: i32) -> u32 {
        let quantity = self.0.entry(product_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Remove one unit of a product. Returns `false` when the product was
    /// not in the cart, in which case nothing changes.
    pub fn decrement(&mut self, product_id: i32) -> bool {
        match self.0.get_mut(&product_id) {
            Some(quantity) if *quantity > 1 => {
                *quantity -= 1;
                true
            }
            Some(_) => {
                self.0.remove(&product_id);
                true
            }
            None => false,
        }
    }

    /// Set an exact quantity; zero removes the entry.
    pub fn set(&mut self, product_id: i32, quantity: u32) {
        if quantity == 0 {
            self.0.remove(&product_id);
        } else {
            self.0.insert(product_id, quantity);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(product_id, quantity)` pairs in product id order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.0.iter().map(|(id, quantity)| (*id, *quantity))
    }

    /// Total number of units across all products.
    pub fn total_items(&self) -> u64 {
        self.0.values().map(|q| u64::from(*q)).sum()
    }

    /// Sum of quantity × `new_price` over products found in `catalog`.
    /// Ids without a catalog match contribute nothing.
    pub fn total_amount(&self, catalog: &[Product]) -> Decimal {
        self.iter()
            .filter_map(|(id, quantity)| {
                catalog
                    .iter()
                    .find(|product| product.id == id)
                    .map(|product| product.new_price * Decimal::from(quantity))
            })
            .sum()
    }
}

impl FromIterator<(i32, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (i32, u32)>>(iter: I) -> Self {
        let mut cart = Cart::new();
        for (product_id, quantity) in iter {
            cart.set(product_id, quantity);
        }
        cart
    }
}
