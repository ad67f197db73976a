use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::SettingModel;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SettingsQuery {
    /// Fetch a single setting instead of the full list
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertSettingRequest {
    #[validate(length(min = 1, message = "Key is required"))]
    #[schema(example = "site_title")]
    pub key: String,
    #[schema(example = "Ana Lens Photography")]
    pub value: String,
    pub description: Option<String>,
}

/// `?key=` yields one setting or `null`; otherwise the full list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SettingsResponse {
    One(Option<SettingModel>),
    All(Vec<SettingModel>),
}
