//! HTTP client for the storefront API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AUTH_TOKEN_HEADER;
use crate::domain::{Cart, Product};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Client-side error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Remote operations the shop context mirrors its state through.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShopApi: Send + Sync {
    async fn all_products(&self) -> ClientResult<Vec<Product>>;

    async fn get_cart(&self, token: &str) -> ClientResult<Cart>;

    async fn add_to_cart(&self, token: &str, item_id: i32) -> ClientResult<()>;

    async fn remove_from_cart(&self, token: &str, item_id: i32) -> ClientResult<()>;

    /// Returns a token for the `auth-token` header
    async fn login(&self, email: &str, password: &str) -> ClientResult<String>;

    /// Returns a token for the `auth-token` header
    async fn signup(&self, username: &str, email: &str, password: &str) -> ClientResult<String>;
}

#[derive(Serialize)]
struct ItemBody {
    #[serde(rename = "itemId")]
    item_id: i32,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    errors: String,
}

/// `ShopApi` over HTTP with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpShopApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success body, or turn the server's error body into
    /// `ClientError::Rejected`.
    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        Err(Self::rejected(status, response).await)
    }

    async fn rejected(status: StatusCode, response: reqwest::Response) -> ClientError {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.errors,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        };
        ClientError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn post_cart(&self, path: &str, token: &str, item_id: i32) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(path))
            .header(AUTH_TOKEN_HEADER, token)
            .json(&ItemBody { item_id })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::rejected(status, response).await)
    }
}

#[async_trait]
impl ShopApi for HttpShopApi {
    async fn all_products(&self) -> ClientResult<Vec<Product>> {
        let response = self.client.get(self.url("/allproducts")).send().await?;
        Self::read(response).await
    }

    async fn get_cart(&self, token: &str) -> ClientResult<Cart> {
        let response = self
            .client
            .post(self.url("/getcart"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn add_to_cart(&self, token: &str, item_id: i32) -> ClientResult<()> {
        self.post_cart("/addtocart", token, item_id).await
    }

    async fn remove_from_cart(&self, token: &str, item_id: i32) -> ClientResult<()> {
        self.post_cart("/removefromcart", token, item_id).await
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginBody { email, password })
            .send()
            .await?;
        Self::read::<TokenBody>(response).await.map(|body| body.token)
    }

    async fn signup(&self, username: &str, email: &str, password: &str) -> ClientResult<String> {
        let response = self
            .client
            .post(self.url("/signup"))
            .json(&SignupBody {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Self::read::<TokenBody>(response).await.map(|body| body.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let api = HttpShopApi::new("http://localhost:4000/");
        assert_eq!(api.url("/allproducts"), "http://localhost:4000/allproducts");
    }

    #[test]
    fn test_item_body_uses_wire_name() {
        let body = serde_json::to_value(ItemBody { item_id: 3 }).unwrap();
        assert_eq!(body, serde_json::json!({ "itemId": 3 }));
    }
}
