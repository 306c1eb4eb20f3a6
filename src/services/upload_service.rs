//! Upload service - validates product images and relays them to the
//! image host.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{is_allowed_image_extension, ALLOWED_IMAGE_EXTENSIONS, IMAGE_PUBLIC_ID_PREFIX};
use crate::errors::{AppError, AppResult};
use crate::infra::{ImageStore, ImageUpload};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Upload service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Store an image and return its public URL
    async fn upload_image(
        &self,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> AppResult<String>;
}

/// Concrete implementation of UploadService
pub struct ImageRelay {
    store: Arc<dyn ImageStore>,
}

impl ImageRelay {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }
}

/// `product_<unix millis>`
fn public_id() -> String {
    format!(
        "{}{}",
        IMAGE_PUBLIC_ID_PREFIX,
        chrono::Utc::now().timestamp_millis()
    )
}

fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[async_trait]
impl UploadService for ImageRelay {
    async fn upload_image(
        &self,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        match extension(&file_name) {
            Some(ext) if is_allowed_image_extension(&ext) => {}
            _ => {
                return Err(AppError::validation(format!(
                    "Unsupported image type, expected one of: {}",
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                )))
            }
        }
        if bytes.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let public_id = public_id();
        let size = bytes.len();
        let url = self
            .store
            .upload(ImageUpload {
                file_name,
                content_type,
                bytes,
                public_id: public_id.clone(),
            })
            .await?;

        tracing::info!(%public_id, size, %url, "Image uploaded");
        Ok(url)
    }
}
