use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    entities::CategoryModel,
    errors::{ApiErrorResponse, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::require_admin,
    schemas::{
        categories::{
            CategoryDetail, CategoryListQuery, CategoryWithCount, CreateCategoryRequest,
            UpdateCategoryRequest,
        },
        MessageResponse,
    },
    services::{auth::Claims, CategoryService},
    AppState,
};

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    description = "Categories ordered by `order`, then name. `galleryCount` counts published galleries only.",
    tag = "categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = Vec<CategoryWithCount>)
    )
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    let categories = CategoryService::list(&app_state.db, &query).await?;
    Ok(Json(categories))
}

/// Get a category with its published galleries
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryDetail),
        (
            status = 404,
            description = "No such category",
            body = ApiErrorResponse,
            example = json!({"error": "Category not found", "status": 404})
        )
    )
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
) -> ApiResult<Json<CategoryDetail>> {
    let category = CategoryService::get_by_id(&app_state.db, category_id).await?;
    Ok(Json(category))
}

/// Get a category by slug
#[utoipa::path(
    get,
    path = "/categories/slug/{slug}",
    tag = "categories",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = CategoryDetail),
        (status = 404, description = "No such category", body = ApiErrorResponse)
    )
)]
pub async fn get_category_by_slug(
    State(app_state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<CategoryDetail>> {
    let category = CategoryService::get_by_slug(&app_state.db, &slug).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = CategoryModel),
        (status = 400, description = "Invalid data", body = ApiErrorResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 403, description = "Not an admin", body = ApiErrorResponse),
        (
            status = 409,
            description = "Slug taken",
            body = ApiErrorResponse,
            example = json!({"error": "A category with this slug already exists", "status": 409})
        )
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryModel>)> {
    require_admin(user_claims)?;
    data.validate()?;

    let category = CategoryService::create(&app_state.db, data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    description = "Partial update. The slug is only re-checked when it changes.",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = CategoryModel),
        (status = 400, description = "Invalid data", body = ApiErrorResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such category", body = ApiErrorResponse),
        (status = 409, description = "Slug taken", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryModel>> {
    require_admin(user_claims)?;
    data.validate()?;

    let category = CategoryService::update(&app_state.db, category_id, data).await?;
    Ok(Json(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such category", body = ApiErrorResponse),
        (
            status = 409,
            description = "Category still has galleries",
            body = ApiErrorResponse,
            example = json!({"error": "Cannot delete category with existing galleries (2)", "status": 409})
        )
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(user_claims)?;

    CategoryService::delete(&app_state.db, category_id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
