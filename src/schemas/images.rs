use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::ImageModel;
use crate::schemas::galleries::GalleryWithCategory;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ImageListQuery {
    #[serde(default)]
    pub gallery_id: Option<i32>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[param(minimum = 1, example = 24)]
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Image registered by URL, no upload involved
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    #[validate(url(message = "Invalid URL"))]
    #[schema(example = "https://cdn.example.com/photography/sunset/1.jpg")]
    pub url: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Width must be positive"))]
    pub width: Option<i32>,
    #[validate(range(min = 1, message = "Height must be positive"))]
    pub height: Option<i32>,
    #[validate(range(min = 0, message = "Size cannot be negative"))]
    pub size: Option<i64>,
    pub format: Option<String>,
    #[schema(example = 1)]
    pub gallery_id: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkCreateImagesRequest {
    #[validate(length(min = 1, message = "At least one image is required"), nested)]
    pub images: Vec<CreateImageRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkCreateImagesResponse {
    #[schema(example = "3 images uploaded successfully")]
    pub message: String,
    #[schema(example = 3)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Width must be positive"))]
    pub width: Option<i32>,
    #[validate(range(min = 1, message = "Height must be positive"))]
    pub height: Option<i32>,
    #[validate(range(min = 0, message = "Size cannot be negative"))]
    pub size: Option<i64>,
    pub format: Option<String>,
    pub gallery_id: Option<i32>,
    pub featured: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageWithGallery {
    #[serde(flatten)]
    pub image: ImageModel,
    pub gallery: Option<GalleryWithCategory>,
}

/// Multipart upload form. The body limit is enforced on the route and by the inspector.
#[derive(Debug, TryFromMultipart)]
pub struct UploadImageForm {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<Bytes>,
    pub alt: Option<String>,
    #[form_data(field_name = "galleryId")]
    pub gallery_id: i32,
}

/// OpenAPI shape of [`UploadImageForm`]
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadImageRequest {
    /// JPEG, PNG, WebP or GIF
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Defaults to the file name without its extension
    pub alt: Option<String>,
    pub gallery_id: i32,
}
