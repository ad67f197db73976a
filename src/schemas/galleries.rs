use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::{CategoryModel, GalleryModel, ImageModel};
use crate::services::slug::validate_slug;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GalleryListQuery {
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub featured: Option<bool>,
    /// `false` lifts the published filter; honoured for admins only
    #[serde(default)]
    pub published: Option<bool>,
    #[param(minimum = 1, example = 12)]
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Sunset")]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "sunset")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(example = 1)]
    pub category_id: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub order: Option<i32>,
}

/// Gallery card used by listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryListItem {
    #[serde(flatten)]
    pub gallery: GalleryModel,
    /// Omitted when the listing is already scoped to one category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryModel>,
    /// First image by order
    pub cover_image: Option<ImageModel>,
    pub image_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDetail {
    #[serde(flatten)]
    pub gallery: GalleryModel,
    pub category: Option<CategoryModel>,
    pub images: Vec<ImageModel>,
}

/// Gallery together with its parent category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryWithCategory {
    #[serde(flatten)]
    pub gallery: GalleryModel,
    pub category: Option<CategoryModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedGallery {
    #[serde(flatten)]
    pub gallery: GalleryModel,
    /// Up to six images by order
    pub images: Vec<ImageModel>,
}
