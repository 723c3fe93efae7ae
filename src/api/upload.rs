//! Upload API endpoints
//!
//! Handles image uploads for the gallery and blog:
//! - POST /api/v1/admin/upload/image - base64 payload, variants generated
//!   server-side, all produced variants stored
//! - POST /api/v1/admin/upload/image-with-webp - caller supplies
//!   pre-generated main/WebP/thumbnail payloads, stored verbatim
//!
//! Both endpoints require the admin token. Files land under the configured
//! upload directory in a per-request folder, with UUID filenames.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};
use crate::services::imaging::{CompressionStats, ImageVariantGenerator, ImagingError};

impl From<ImagingError> for ApiError {
    fn from(e: ImagingError) -> Self {
        match e {
            ImagingError::InvalidFileType(t) => {
                ApiError::validation_error(format!("Invalid file type: {}", t))
            }
            ImagingError::FileTooLarge { size, limit } => ApiError::payload_too_large(format!(
                "File too large: {} bytes (limit {} bytes)",
                size, limit
            )),
            ImagingError::ImageLoadFailed(msg) => {
                ApiError::validation_error(format!("Failed to process image: {}", msg))
            }
            ImagingError::FileReadFailed(msg) => {
                ApiError::validation_error(format!("Failed to read file data: {}", msg))
            }
            ImagingError::EncoderUnavailable => {
                ApiError::internal_error("Image encoder unavailable")
            }
        }
    }
}

/// Request body for POST /upload/image
#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub file_name: String,
    /// Base64 image bytes, no data-URL prefix
    pub file_data: String,
    pub content_type: String,
    #[serde(default)]
    pub folder: String,
}

/// Response for POST /upload/image
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub stats: CompressionStats,
}

/// Request body for POST /upload/image-with-webp
#[derive(Debug, Deserialize)]
pub struct UploadWithWebpRequest {
    pub file_name: String,
    /// Base64 main image bytes
    pub main_data: String,
    pub main_content_type: String,
    /// Base64 WebP bytes, if the caller produced one
    #[serde(default)]
    pub webp_data: Option<String>,
    /// Base64 WebP thumbnail bytes, if the caller produced one
    #[serde(default)]
    pub thumbnail_data: Option<String>,
    #[serde(default)]
    pub folder: String,
}

/// Response for POST /upload/image-with-webp
#[derive(Debug, Serialize)]
pub struct UploadWithWebpResponse {
    pub url: String,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp_url: Option<String>,
}

/// Request bodies carry base64 payloads for inputs up to 20MB, so the
/// default body limit is far too small here
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Build the upload router (mounted under the admin guard)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image", post(upload_image))
        .route("/image-with-webp", post(upload_image_with_webp))
        .layer(axum::extract::DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// POST /api/v1/admin/upload/image
///
/// Decodes the payload, runs the variant generator, and stores every
/// produced variant. The returned URL points at the JPEG main variant.
async fn upload_image(
    State(state): State<AppState>,
    Json(request): Json<UploadImageRequest>,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let folder = sanitize_folder(&request.folder)?;
    let bytes = ImageVariantGenerator::decode_payload(&request.file_data)?;

    if !state.upload_config.is_type_allowed(&request.content_type) {
        return Err(ApiError::validation_error(format!(
            "Invalid file type: {}. Allowed types: {:?}",
            request.content_type, state.upload_config.allowed_types
        )));
    }

    let set = state.generator.generate(&bytes, &request.content_type)?;

    let dir = state.upload_config.path.join(&folder);
    ensure_upload_dir(&dir).await?;

    let stem = Uuid::new_v4();

    let url = store_variant(&dir, &folder, &format!("{}.jpg", stem), &set.main.data).await?;

    let webp_url = match &set.webp {
        Some(variant) => Some(
            store_variant(&dir, &folder, &format!("{}.webp", stem), &variant.data).await?,
        ),
        None => None,
    };

    let thumbnail_url = match &set.thumbnail {
        Some(variant) => Some(
            store_variant(&dir, &folder, &format!("{}-thumb.webp", stem), &variant.data).await?,
        ),
        None => None,
    };

    tracing::info!(
        "Stored upload {} ({} -> {} bytes, {:.1}% saved)",
        request.file_name,
        set.stats.original_bytes,
        set.stats.compressed_bytes,
        set.stats.savings
    );

    Ok(Json(UploadImageResponse {
        url,
        webp_url,
        thumbnail_url,
        stats: set.stats,
    }))
}

/// POST /api/v1/admin/upload/image-with-webp
///
/// Stores caller-provided variants verbatim. When no thumbnail payload is
/// supplied the thumbnail URL falls back to the main image.
async fn upload_image_with_webp(
    State(state): State<AppState>,
    Json(request): Json<UploadWithWebpRequest>,
) -> Result<Json<UploadWithWebpResponse>, ApiError> {
    let folder = sanitize_folder(&request.folder)?;

    if !state
        .upload_config
        .is_type_allowed(&request.main_content_type)
    {
        return Err(ApiError::validation_error(format!(
            "Invalid file type: {}",
            request.main_content_type
        )));
    }

    let dir = state.upload_config.path.join(&folder);
    ensure_upload_dir(&dir).await?;

    let stem = Uuid::new_v4();
    let ext = state.upload_config.get_extension(&request.main_content_type);

    let url = store_variant(&dir, &folder, &format!("{}.{}", stem, ext), &request.main_data).await?;

    let webp_url = match &request.webp_data {
        Some(data) => Some(store_variant(&dir, &folder, &format!("{}.webp", stem), data).await?),
        None => None,
    };

    let thumbnail_url = match &request.thumbnail_data {
        Some(data) => store_variant(&dir, &folder, &format!("{}-thumb.webp", stem), data).await?,
        None => url.clone(),
    };

    Ok(Json(UploadWithWebpResponse {
        url,
        thumbnail_url,
        webp_url,
    }))
}

/// Decode one base64 payload and write it under the upload directory,
/// returning its public URL
async fn store_variant(
    dir: &Path,
    folder: &str,
    filename: &str,
    data: &str,
) -> Result<String, ApiError> {
    let bytes = ImageVariantGenerator::decode_payload(data)?;
    let path = dir.join(filename);
    fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;
    Ok(format!("/uploads/{}/{}", folder, filename))
}

/// Ensure upload directory exists
async fn ensure_upload_dir(path: &PathBuf) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Folder names are a single path segment of safe characters; anything else
/// (separators, dots) is rejected to keep writes inside the upload root
fn sanitize_folder(folder: &str) -> Result<String, ApiError> {
    let folder = folder.trim();
    let folder = if folder.is_empty() { "general" } else { folder };

    if folder.len() > 64
        || !folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::validation_error(format!(
            "Invalid upload folder: '{}'",
            folder
        )));
    }
    Ok(folder.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_sanitization() {
        assert_eq!(sanitize_folder("").unwrap(), "general");
        assert_eq!(sanitize_folder("gallery").unwrap(), "gallery");
        assert_eq!(sanitize_folder("blog_images-2").unwrap(), "blog_images-2");

        for bad in ["../etc", "a/b", "a\\b", "dot.dot", "sp ace"] {
            assert!(sanitize_folder(bad).is_err(), "'{}' should be rejected", bad);
        }
    }
}
