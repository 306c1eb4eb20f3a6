//! Client tests against a live server bound to an ephemeral port.

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};

use common::test_app;
use storefront_api::client::{ClientError, HttpShopApi, ShopApi, ShopContext};
use storefront_api::domain::NewProduct;
use storefront_api::infra::ProductRepository;

/// Serve a fresh app and return its base URL and in-memory store.
async fn spawn_app() -> (String, Arc<common::InMemoryStore>) {
    let app = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.router).await.unwrap();
    });

    (format!("http://{addr}"), app.store)
}

fn new_product(name: &str, price: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        image: format!("https://img.test/{name}.png"),
        category: "women".to_string(),
        new_price: Decimal::new(price, 0),
        old_price: Decimal::new(price + 5, 0),
    }
}

#[tokio::test]
async fn test_shop_context_full_session() {
    let (base_url, store) = spawn_app().await;
    store.products.create(new_product("blouse", 10)).await.unwrap();
    store.products.create(new_product("skirt", 20)).await.unwrap();

    let shop = ShopContext::new(Arc::new(HttpShopApi::new(&base_url)));
    shop.load().await;
    assert_eq!(shop.products().await.len(), 2);

    assert_ok!(shop.signup("Jane", "jane@example.com", "password123").await);
    assert!(shop.token().await.is_some());
    assert!(shop.cart().await.is_empty());

    assert_ok!(shop.add_to_cart(1).await);
    assert_ok!(shop.add_to_cart(1).await);
    assert_ok!(shop.add_to_cart(2).await);
    assert_ok!(shop.add_to_cart(9).await);

    assert_eq!(shop.total_cart_items().await, 4);
    assert_eq!(shop.total_cart_amount().await, Decimal::new(40, 0));

    // A second session for the same account sees the mirrored cart
    let other = ShopContext::new(Arc::new(HttpShopApi::new(&base_url)));
    assert_ok!(other.login("jane@example.com", "password123").await);
    assert_eq!(other.cart().await, shop.cart().await);

    assert_ok!(other.remove_from_cart(9).await);
    other.load().await;
    assert_eq!(other.cart().await.quantity(9), 0);
    assert_eq!(other.total_cart_amount().await, Decimal::new(40, 0));
}

#[tokio::test]
async fn test_invalid_token_reverts_local_change() {
    let (base_url, _store) = spawn_app().await;

    let shop = ShopContext::with_token(Arc::new(HttpShopApi::new(&base_url)), "not-a-token");
    let err = assert_err!(shop.add_to_cart(3).await);

    assert!(matches!(err, ClientError::Rejected { status: 401, .. }));
    assert_eq!(shop.cart().await.quantity(3), 0);
}

#[tokio::test]
async fn test_login_errors_carry_server_message() {
    let (base_url, _store) = spawn_app().await;
    let api = HttpShopApi::new(base_url);

    let err = assert_err!(api.login("ghost@example.com", "password123").await);
    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Wrong email");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_leaves_catalog_empty() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let shop = ShopContext::new(Arc::new(HttpShopApi::new(format!("http://{addr}"))));
    shop.load().await;

    assert!(shop.products().await.is_empty());
}
