use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::CategoryModel;
use crate::schemas::galleries::GalleryListItem;
use crate::services::slug::validate_slug;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Only categories with this featured flag
    #[serde(default)]
    pub featured: Option<bool>,
    /// Maximum number of categories
    #[param(minimum = 1, example = 6)]
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Wedding")]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "wedding")]
    pub slug: String,
    pub description: Option<String>,
    #[validate(url(message = "Cover image must be a URL"))]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Cover image must be a URL"))]
    pub cover_image: Option<String>,
    pub featured: Option<bool>,
    pub order: Option<i32>,
}

/// Category list entry with its number of published galleries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: CategoryModel,
    #[schema(example = 4)]
    pub gallery_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: CategoryModel,
    /// Published galleries, each with its cover image and image count
    pub galleries: Vec<GalleryListItem>,
    /// All galleries in the category, published or not
    pub gallery_count: u64,
}
