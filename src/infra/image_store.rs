//! Remote image hosting.
//!
//! Uploads are relayed to a Cloudinary-compatible endpoint using a signed
//! multipart request. The public URL returned by the host is what the
//! catalog stores on each product.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::{ImageStoreConfig, SignatureAlgorithm, ALLOWED_IMAGE_EXTENSIONS};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A single file ready to be pushed to the image host.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub public_id: String,
}

/// Image host trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the file and return its public URL
    async fn upload(&self, upload: ImageUpload) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

/// Cloudinary upload API client
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: ImageStoreConfig,
}

impl std::fmt::Debug for CloudinaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CloudinaryStore {
    pub fn new(config: ImageStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Parameters covered by the request signature, sorted by name.
    fn signed_params(&self, public_id: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        vec![
            ("allowed_formats", ALLOWED_IMAGE_EXTENSIONS.join(",")),
            ("folder", self.config.folder.clone()),
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.to_string()),
        ]
    }
}

/// Sign an upload request.
///
/// # Arguments
/// * `params` - Signed parameters, already sorted by name
/// * `api_secret` - Account secret appended to the serialized parameters
/// * `algorithm` - Digest configured for the account on the image host
///
/// # Returns
/// Hex digest of `k1=v1&k2=v2...` followed by the secret
fn sign(params: &[(&str, String)], api_secret: &str, algorithm: SignatureAlgorithm) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => digest_hex::<Sha1>(&to_sign, api_secret),
        SignatureAlgorithm::Sha256 => digest_hex::<Sha256>(&to_sign, api_secret),
    }
}

fn digest_hex<D: Digest>(to_sign: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, upload: ImageUpload) -> AppResult<String> {
        if !self.config.is_configured() {
            return Err(AppError::upstream("Image host credentials are not configured"));
        }

        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(&upload.public_id, timestamp);
        let signature = sign(
            &params,
            self.config.api_secret(),
            self.config.signature_algorithm,
        );

        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::validation(format!("Invalid content type: {e}")))?;
        }

        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }
        let form = form.part("file", part);

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Image host request failed");
                AppError::upstream("Image host unreachable")
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UploadErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::warn!(%status, %message, "Image host rejected upload");
            return Err(AppError::upstream(message));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Unreadable image host response");
            AppError::upstream("Unreadable image host response")
        })?;

        body.secure_url
            .or(body.url)
            .ok_or_else(|| AppError::upstream("Image host returned no URL"))
    }
}
