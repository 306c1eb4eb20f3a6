//! OpenAPI documentation configuration.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, cart_handler, product_handler, upload_handler};
use crate::config::AUTH_TOKEN_HEADER;
use crate::domain::{Cart, Product};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Product catalog, accounts, carts and image uploads for the storefront"
    ),
    servers(
        (url = "http://localhost:4000", description = "Local development server")
    ),
    paths(
        auth_handler::signup,
        auth_handler::login,
        product_handler::add_product,
        product_handler::remove_product,
        product_handler::all_products,
        product_handler::new_collections,
        product_handler::popular_in_women,
        product_handler::popular_in_category,
        upload_handler::upload,
        cart_handler::add_to_cart,
        cart_handler::remove_from_cart,
        cart_handler::get_cart,
    ),
    components(
        schemas(
            Product,
            Cart,
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            auth_handler::AuthResponse,
            product_handler::AddProductRequest,
            product_handler::RemoveProductRequest,
            product_handler::ProductMutationResponse,
            upload_handler::UploadResponse,
            upload_handler::UploadForm,
            cart_handler::CartItemRequest,
            cart_handler::CartMessage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Signup and login"),
        (name = "Catalog", description = "Products and product images"),
        (name = "Cart", description = "Per-user cart, requires auth-token")
    )
)]
pub struct ApiDoc;

/// Registers the `auth-token` header scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "auth_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    AUTH_TOKEN_HEADER,
                    "JWT returned by /signup or /login",
                ))),
            );
        }
    }
}
