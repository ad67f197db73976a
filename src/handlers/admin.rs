use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    errors::{ApiErrorResponse, ApiResult},
    middleware::require_admin,
    schemas::admin::DashboardStats,
    services::{auth::Claims, StatsService},
    AppState,
};

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/admin/stats",
    description = "Each counter is computed independently and falls back to zero when its query fails.",
    tag = "admin",
    responses(
        (status = 200, description = "Statistics", body = DashboardStats),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 403, description = "Not an admin", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<DashboardStats>> {
    require_admin(user_claims)?;

    Ok(Json(StatsService::dashboard(&app_state.db).await))
}
