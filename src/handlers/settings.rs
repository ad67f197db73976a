use axum::{
    extract::{Extension, State},
    Json,
};
use validator::Validate;

use crate::{
    entities::SettingModel,
    errors::{ApiErrorResponse, ApiResult},
    extract::{ApiJson, ApiQuery},
    middleware::require_admin,
    schemas::settings::{SettingsQuery, SettingsResponse, UpsertSettingRequest},
    services::{auth::Claims, SettingsService},
    AppState,
};

/// Read site settings
#[utoipa::path(
    get,
    path = "/settings",
    description = "With `key`, returns that setting or `null`. Without it, returns every setting ordered by key.",
    tag = "settings",
    params(SettingsQuery),
    responses(
        (status = 200, description = "One setting, null, or the full list", body = SettingsResponse)
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<SettingsQuery>,
) -> ApiResult<Json<SettingsResponse>> {
    let response = match query.key.as_deref() {
        Some(key) => SettingsResponse::One(SettingsService::get(&app_state.db, key).await?),
        None => SettingsResponse::All(SettingsService::list(&app_state.db).await?),
    };
    Ok(Json(response))
}

/// Create or overwrite a setting
#[utoipa::path(
    post,
    path = "/settings",
    tag = "settings",
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Saved", body = SettingModel),
        (status = 400, description = "Invalid data", body = ApiErrorResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 403, description = "Not an admin", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_setting(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<UpsertSettingRequest>,
) -> ApiResult<Json<SettingModel>> {
    require_admin(user_claims)?;
    data.validate()?;

    let setting = SettingsService::upsert(&app_state.db, data).await?;
    Ok(Json(setting))
}
