use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    errors::{ApiErrorResponse, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::require_admin,
    schemas::{
        galleries::{
            CreateGalleryRequest, FeaturedGallery, GalleryDetail, GalleryListItem,
            GalleryListQuery, UpdateGalleryRequest,
        },
        MessageResponse,
    },
    services::{auth::Claims, gallery::GalleryLookup, GalleryService},
    AppState,
};

fn is_admin(user_claims: &Option<Extension<Claims>>) -> bool {
    user_claims
        .as_ref()
        .is_some_and(|Extension(claims)| claims.is_admin())
}

/// List galleries
#[utoipa::path(
    get,
    path = "/galleries",
    description = "Published galleries ordered by `order`, newest first on ties. Admins may pass `published=false` to include drafts.",
    tag = "galleries",
    params(GalleryListQuery),
    responses(
        (status = 200, description = "Galleries", body = Vec<GalleryListItem>)
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn list_galleries(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<GalleryListQuery>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<Vec<GalleryListItem>>> {
    let galleries =
        GalleryService::list(&app_state.db, &query, is_admin(&user_claims)).await?;
    Ok(Json(galleries))
}

/// Newest featured gallery
#[utoipa::path(
    get,
    path = "/galleries/featured",
    tag = "galleries",
    responses(
        (status = 200, description = "Featured gallery with up to six images", body = FeaturedGallery),
        (status = 404, description = "Nothing featured", body = ApiErrorResponse)
    )
)]
pub async fn get_featured_gallery(
    State(app_state): State<AppState>,
) -> ApiResult<Json<FeaturedGallery>> {
    let gallery = GalleryService::featured(&app_state.db).await?;
    Ok(Json(gallery))
}

/// Get a gallery
#[utoipa::path(
    get,
    path = "/galleries/{id}",
    description = "Counts a view for public callers. Drafts are only visible to admins.",
    tag = "galleries",
    params(("id" = i32, Path, description = "Gallery ID")),
    responses(
        (status = 200, description = "Gallery with category and images", body = GalleryDetail),
        (
            status = 404,
            description = "No such published gallery",
            body = ApiErrorResponse,
            example = json!({"error": "Gallery not found", "status": 404})
        )
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn get_gallery(
    State(app_state): State<AppState>,
    ApiPath(gallery_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<GalleryDetail>> {
    let gallery = GalleryService::get(
        &app_state.db,
        GalleryLookup::Id(gallery_id),
        is_admin(&user_claims),
    )
    .await?;
    Ok(Json(gallery))
}

/// Get a published gallery by slug
#[utoipa::path(
    get,
    path = "/galleries/slug/{slug}",
    description = "Counts a view. Unpublished galleries are reported as missing.",
    tag = "galleries",
    params(("slug" = String, Path, description = "Gallery slug")),
    responses(
        (status = 200, description = "Gallery with category and images", body = GalleryDetail),
        (status = 404, description = "No such published gallery", body = ApiErrorResponse)
    )
)]
pub async fn get_gallery_by_slug(
    State(app_state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<GalleryDetail>> {
    let gallery = GalleryService::get(&app_state.db, GalleryLookup::Slug(&slug), false).await?;
    Ok(Json(gallery))
}

/// Create a gallery
#[utoipa::path(
    post,
    path = "/galleries",
    tag = "galleries",
    request_body = CreateGalleryRequest,
    responses(
        (status = 201, description = "Created", body = GalleryListItem),
        (
            status = 400,
            description = "Invalid data or unknown category",
            body = ApiErrorResponse,
            example = json!({"error": "Category not found", "status": 400})
        ),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 409, description = "Slug taken", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_gallery(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<CreateGalleryRequest>,
) -> ApiResult<(StatusCode, Json<GalleryListItem>)> {
    require_admin(user_claims)?;
    data.validate()?;

    let gallery = GalleryService::create(&app_state.db, data).await?;
    Ok((StatusCode::CREATED, Json(gallery)))
}

/// Update a gallery
#[utoipa::path(
    put,
    path = "/galleries/{id}",
    description = "Partial update. The slug is only re-checked when it changes.",
    tag = "galleries",
    params(("id" = i32, Path, description = "Gallery ID")),
    request_body = UpdateGalleryRequest,
    responses(
        (status = 200, description = "Updated", body = GalleryListItem),
        (status = 400, description = "Invalid data or unknown category", body = ApiErrorResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such gallery", body = ApiErrorResponse),
        (status = 409, description = "Slug taken", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_gallery(
    State(app_state): State<AppState>,
    ApiPath(gallery_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<UpdateGalleryRequest>,
) -> ApiResult<Json<GalleryListItem>> {
    require_admin(user_claims)?;
    data.validate()?;

    let gallery = GalleryService::update(&app_state.db, gallery_id, data).await?;
    Ok(Json(gallery))
}

/// Delete a gallery and its images
#[utoipa::path(
    delete,
    path = "/galleries/{id}",
    description = "Images go with the gallery. Their stored files are removed best-effort.",
    tag = "galleries",
    params(("id" = i32, Path, description = "Gallery ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such gallery", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_gallery(
    State(app_state): State<AppState>,
    ApiPath(gallery_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(user_claims)?;

    GalleryService::delete(&app_state.db, app_state.media.as_ref(), gallery_id).await?;
    Ok(Json(MessageResponse::new("Gallery deleted successfully")))
}
