//! Image upload handler.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::config::{MAX_UPLOAD_BYTES, UPLOAD_FIELD_NAME};
use crate::errors::{AppError, AppResult};

/// Hosted image location
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always 1 on success
    #[schema(example = 1)]
    pub success: u8,
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/product_1700000000000.png")]
    pub image_url: String,
}

/// Multipart form with a single image file
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    product: Vec<u8>,
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Relay an image to the image host
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Catalog",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 502, description = "Image host rejected the upload")
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        let image_url = state
            .upload_service
            .upload_image(file_name, content_type, bytes.to_vec())
            .await?;

        return Ok(Json(UploadResponse {
            success: 1,
            image_url,
        }));
    }

    Err(AppError::validation(format!(
        "Multipart field '{UPLOAD_FIELD_NAME}' is required"
    )))
}
