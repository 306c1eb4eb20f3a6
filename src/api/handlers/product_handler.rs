//! Catalog handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{FEATURED_CATEGORY, MAX_PRICE_INTEGER_DIGITS, PRICE_SCALE};
use crate::domain::{NewProduct, Product};
use crate::errors::AppResult;

fn price_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Prices must fit the stored `NUMERIC(12, 2)` column exactly.
fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(price_error("non_negative", "Prices cannot be negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(price_error("scale", "Prices have at most two decimal places"));
    }
    if price.trunc() >= Decimal::from(10_i64.pow(MAX_PRICE_INTEGER_DIGITS)) {
        return Err(price_error("range", "Price is too large"));
    }
    Ok(())
}

/// New product fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Striped flutter sleeve blouse")]
    pub name: String,
    /// Public image URL, usually from `/upload`
    #[validate(url(message = "Image must be a URL"))]
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/product_1.png")]
    pub image: String,
    #[validate(length(min = 1, message = "Category is required"))]
    #[schema(example = "women")]
    pub category: String,
    #[validate(custom(function = "valid_price"))]
    #[schema(value_type = f64, example = 50.0)]
    pub new_price: Decimal,
    #[validate(custom(function = "valid_price"))]
    #[schema(value_type = f64, example = 80.5)]
    pub old_price: Decimal,
}

impl From<AddProductRequest> for NewProduct {
    fn from(req: AddProductRequest) -> Self {
        Self {
            name: req.name,
            image: req.image,
            category: req.category,
            new_price: req.new_price,
            old_price: req.old_price,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveProductRequest {
    #[schema(example = 1)]
    pub id: i32,
}

/// Result of a catalog mutation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductMutationResponse {
    pub success: bool,
    /// Name of the product added or removed; null when nothing was removed
    pub name: Option<String>,
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/addproduct", post(add_product))
        .route("/removeproduct", post(remove_product))
        .route("/allproducts", get(all_products))
        .route("/newcollections", get(new_collections))
        .route("/popularinwomen", get(popular_in_women))
        .route("/popular/:category", get(popular_in_category))
}

/// Add a product under the next free id
#[utoipa::path(
    post,
    path = "/addproduct",
    tag = "Catalog",
    request_body = AddProductRequest,
    responses(
        (status = 200, description = "Product added", body = ProductMutationResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn add_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddProductRequest>,
) -> AppResult<Json<ProductMutationResponse>> {
    let product = state.product_service.add_product(payload.into()).await?;

    Ok(Json(ProductMutationResponse {
        success: true,
        name: Some(product.name),
    }))
}

/// Remove a product by id
#[utoipa::path(
    post,
    path = "/removeproduct",
    tag = "Catalog",
    request_body = RemoveProductRequest,
    responses(
        (status = 200, description = "Removed, or nothing matched", body = ProductMutationResponse)
    )
)]
pub async fn remove_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RemoveProductRequest>,
) -> AppResult<Json<ProductMutationResponse>> {
    let removed = state.product_service.remove_product(payload.id).await?;

    Ok(Json(ProductMutationResponse {
        success: true,
        name: removed.map(|p| p.name),
    }))
}

/// Every product, ordered by id
#[utoipa::path(
    get,
    path = "/allproducts",
    tag = "Catalog",
    responses((status = 200, body = Vec<Product>))
)]
pub async fn all_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.product_service.list_all().await?))
}

/// Newest products first
#[utoipa::path(
    get,
    path = "/newcollections",
    tag = "Catalog",
    responses((status = 200, body = Vec<Product>))
)]
pub async fn new_collections(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.product_service.list_newest().await?))
}

/// Featured products in the women's category
#[utoipa::path(
    get,
    path = "/popularinwomen",
    tag = "Catalog",
    responses((status = 200, body = Vec<Product>))
)]
pub async fn popular_in_women(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(
        state
            .product_service
            .list_popular_in_category(FEATURED_CATEGORY)
            .await?,
    ))
}

/// Featured products in any category
#[utoipa::path(
    get,
    path = "/popular/{category}",
    tag = "Catalog",
    params(("category" = String, Path, description = "Category to filter on")),
    responses((status = 200, body = Vec<Product>))
)]
pub async fn popular_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(
        state
            .product_service
            .list_popular_in_category(&category)
            .await?,
    ))
}
