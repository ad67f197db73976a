use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dashboard counters. Every field falls back to zero or empty on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_categories: u64,
    pub total_galleries: u64,
    pub total_images: u64,
    pub total_contacts: u64,
    /// Sum of views over every gallery
    pub total_views: i64,
    /// Created within the last calendar month
    pub recent_categories: u64,
    pub recent_galleries: u64,
    pub recent_images: u64,
    pub recent_contacts: u64,
    pub pending_contacts: u64,
    /// Top five by views
    pub popular_galleries: Vec<PopularGallery>,
    /// Five newest
    pub recent_galleries_list: Vec<RecentGallery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularGallery {
    pub id: i32,
    pub title: String,
    /// Category name, or `Uncategorized`
    pub category: String,
    pub views: i32,
    pub image_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentGallery {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub image_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "connected")]
    pub database: String,
    #[schema(example = "production")]
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
