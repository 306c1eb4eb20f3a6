//! Product catalog entity and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product listing as served to the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Catalog id, one past the highest id ever assigned
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Striped Flutter Sleeve Blouse")]
    pub name: String,
    /// Image URL on the image host
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/product_1700000000000.png")]
    pub image: String,
    #[schema(example = "women")]
    pub category: String,
    #[schema(example = 50.0)]
    pub new_price: Decimal,
    #[schema(example = 80.5)]
    pub old_price: Decimal,
    /// Creation timestamp
    pub date: DateTime<Utc>,
    pub available: bool,
}

impl Product {
    /// Id for the next product given the highest id assigned so far.
    pub fn next_id(current_max: Option<i32>) -> i32 {
        current_max.map_or(1, |max| max + 1)
    }
}

/// Fields supplied when listing a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: Decimal,
    pub old_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_starts_at_one() {
        assert_eq!(Product::next_id(None), 1);
    }

    #[test]
    fn test_next_id_follows_maximum() {
        assert_eq!(Product::next_id(Some(1)), 2);
        assert_eq!(Product::next_id(Some(41)), 42);
    }

    #[test]
    fn test_prices_serialize_as_numbers() {
        let product = Product {
            id: 1,
            name: "Boys Orange Colourblocked Hooded Sweatshirt".to_string(),
            image: "https://example.com/p1.png".to_string(),
            category: "kid".to_string(),
            new_price: Decimal::new(6000, 2),
            old_price: Decimal::new(10050, 2),
            date: Utc::now(),
            available: true,
        };
        let json = serde_json::to_value(&product).unwrap();

        assert!(json["new_price"].is_number());
        assert_eq!(json["new_price"].as_f64(), Some(60.0));
        assert_eq!(json["old_price"].as_f64(), Some(100.5));
    }
}
