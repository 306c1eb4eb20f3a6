//! Client-side shop state.
//!
//! `ShopContext` mirrors the catalog and the signed-in user's cart. Cart
//! changes apply locally first and are then sent to the server; a failed
//! server call undoes the local change.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::api::{ClientResult, ShopApi};
use crate::domain::{Cart, Product};

#[derive(Debug, Default)]
struct ShopState {
    products: Vec<Product>,
    cart: Cart,
    token: Option<String>,
}

/// Shared shop state. Clones point at the same state.
#[derive(Clone)]
pub struct ShopContext {
    api: Arc<dyn ShopApi>,
    state: Arc<RwLock<ShopState>>,
}

impl ShopContext {
    pub fn new(api: Arc<dyn ShopApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ShopState::default())),
        }
    }

    /// Start with a previously stored token
    pub fn with_token(api: Arc<dyn ShopApi>, token: impl Into<String>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ShopState {
                token: Some(token.into()),
                ..ShopState::default()
            })),
        }
    }

    /// Fetch the catalog and, when signed in, the server-side cart.
    ///
    /// Failures are logged and leave the affected part of the state as it was.
    pub async fn load(&self) {
        let token = self.token().await;

        let products = self.api.all_products();
        let cart = async {
            match token.as_deref() {
                Some(token) => Some(self.api.get_cart(token).await),
                None => None,
            }
        };
        let (products, cart) = tokio::join!(products, cart);

        let mut state = self.state.write().await;
        match products {
            Ok(products) => state.products = products,
            Err(e) => tracing::warn!(error = %e, "Failed to load products"),
        }
        match cart {
            Some(Ok(cart)) => state.cart = cart,
            Some(Err(e)) => tracing::warn!(error = %e, "Failed to load cart"),
            None => {}
        }
    }

    /// Sign in, remember the token and pull the account's cart.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        let token = self.api.login(email, password).await?;
        self.adopt_token(token).await
    }

    /// Create an account, remember the token and pull its (empty) cart.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> ClientResult<()> {
        let token = self.api.signup(username, email, password).await?;
        self.adopt_token(token).await
    }

    async fn adopt_token(&self, token: String) -> ClientResult<()> {
        let cart = self.api.get_cart(&token).await?;
        let mut state = self.state.write().await;
        state.token = Some(token);
        state.cart = cart;
        Ok(())
    }

    /// Forget the token and clear the local cart
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        state.token = None;
        state.cart = Cart::new();
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn cart(&self) -> Cart {
        self.state.read().await.cart.clone()
    }

    /// Add one unit locally, then on the server when signed in.
    pub async fn add_to_cart(&self, item_id: i32) -> ClientResult<()> {
        let token = {
            let mut state = self.state.write().await;
            state.cart.increment(item_id);
            state.token.clone()
        };

        let Some(token) = token else {
            return Ok(());
        };

        if let Err(e) = self.api.add_to_cart(&token, item_id).await {
            tracing::warn!(error = %e, item_id, "Add to cart failed, reverting");
            self.state.write().await.cart.decrement(item_id);
            return Err(e);
        }
        Ok(())
    }

    /// Remove one unit locally, then on the server when signed in.
    pub async fn remove_from_cart(&self, item_id: i32) -> ClientResult<()> {
        let (removed, token) = {
            let mut state = self.state.write().await;
            (state.cart.decrement(item_id), state.token.clone())
        };

        let Some(token) = token else {
            return Ok(());
        };

        if let Err(e) = self.api.remove_from_cart(&token, item_id).await {
            tracing::warn!(error = %e, item_id, "Remove from cart failed, reverting");
            if removed {
                self.state.write().await.cart.increment(item_id);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Sum of all quantities in the cart
    pub async fn total_cart_items(&self) -> u64 {
        self.state.read().await.cart.total_items()
    }

    /// Sum of quantity times `new_price`, skipping ids missing from the catalog
    pub async fn total_cart_amount(&self) -> Decimal {
        let state = self.state.read().await;
        state.cart.total_amount(&state.products)
    }
}
