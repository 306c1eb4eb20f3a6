//! Cart handlers. Every route here sits behind `auth_middleware`.

use axum::{extract::State, response::Json, routing::post, Extension, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Cart;
use crate::errors::AppResult;

/// Product whose quantity changes
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CartItemRequest {
    #[serde(rename = "itemId")]
    #[validate(range(min = 1, message = "itemId must be a product id"))]
    #[schema(example = 12)]
    pub item_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartMessage {
    pub success: bool,
    #[schema(example = "Added to cart")]
    pub message: String,
}

impl CartMessage {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/addtocart", post(add_to_cart))
        .route("/removefromcart", post(remove_from_cart))
        .route("/getcart", post(get_cart))
}

/// Add one unit of a product
#[utoipa::path(
    post,
    path = "/addtocart",
    tag = "Cart",
    request_body = CartItemRequest,
    responses(
        (status = 200, body = CartMessage),
        (status = 401, description = "Missing or invalid auth-token")
    ),
    security(("auth_token" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CartItemRequest>,
) -> AppResult<Json<CartMessage>> {
    state.cart_service.add_to_cart(user.id, payload.item_id).await?;
    Ok(Json(CartMessage::ok("Added to cart")))
}

/// Remove one unit of a product, never going below zero
#[utoipa::path(
    post,
    path = "/removefromcart",
    tag = "Cart",
    request_body = CartItemRequest,
    responses(
        (status = 200, body = CartMessage),
        (status = 401, description = "Missing or invalid auth-token")
    ),
    security(("auth_token" = []))
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CartItemRequest>,
) -> AppResult<Json<CartMessage>> {
    state
        .cart_service
        .remove_from_cart(user.id, payload.item_id)
        .await?;
    Ok(Json(CartMessage::ok("Removed from cart")))
}

/// Current cart as a map of product id to quantity
#[utoipa::path(
    post,
    path = "/getcart",
    tag = "Cart",
    responses(
        (status = 200, body = Cart),
        (status = 401, description = "Missing or invalid auth-token")
    ),
    security(("auth_token" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Cart>> {
    Ok(Json(state.cart_service.get_cart(user.id).await?))
}
