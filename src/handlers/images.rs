use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_typed_multipart::BaseMultipart;
use validator::Validate;

use crate::{
    entities::ImageModel,
    errors::{ApiError, ApiErrorResponse, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::require_admin,
    schemas::{
        images::{
            BulkCreateImagesRequest, BulkCreateImagesResponse, CreateImageRequest,
            ImageListQuery, ImageWithGallery, UpdateImageRequest, UploadImageForm,
            UploadImageRequest,
        },
        MessageResponse,
    },
    services::{auth::Claims, upload::UploadInput, ImageService, UploadService},
    AppState,
};

/// List images
#[utoipa::path(
    get,
    path = "/images",
    tag = "images",
    params(ImageListQuery),
    responses(
        (status = 200, description = "Images with their gallery and category", body = Vec<ImageWithGallery>)
    )
)]
pub async fn list_images(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ImageListQuery>,
) -> ApiResult<Json<Vec<ImageWithGallery>>> {
    let images = ImageService::list(&app_state.db, &query).await?;
    Ok(Json(images))
}

/// Get an image
#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "images",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image", body = ImageWithGallery),
        (
            status = 404,
            description = "No such image",
            body = ApiErrorResponse,
            example = json!({"error": "Image not found", "status": 404})
        )
    )
)]
pub async fn get_image(
    State(app_state): State<AppState>,
    ApiPath(image_id): ApiPath<i32>,
) -> ApiResult<Json<ImageWithGallery>> {
    let image = ImageService::get(&app_state.db, image_id).await?;
    Ok(Json(image))
}

/// Register an image by URL
#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Created", body = ImageWithGallery),
        (
            status = 400,
            description = "Invalid data or unknown gallery",
            body = ApiErrorResponse,
            example = json!({"error": "Gallery not found", "status": 400})
        ),
        (status = 401, description = "Not logged in", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_image(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<CreateImageRequest>,
) -> ApiResult<(StatusCode, Json<ImageWithGallery>)> {
    require_admin(user_claims)?;
    data.validate()?;

    let image = ImageService::create(&app_state.db, data).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Register many images by URL
#[utoipa::path(
    post,
    path = "/images/bulk",
    description = "All referenced galleries must exist, otherwise nothing is inserted.",
    tag = "images",
    request_body = BulkCreateImagesRequest,
    responses(
        (status = 201, description = "Created", body = BulkCreateImagesResponse),
        (
            status = 400,
            description = "Invalid data or unknown gallery",
            body = ApiErrorResponse,
            example = json!({"error": "One or more galleries not found", "status": 400})
        ),
        (status = 401, description = "Not logged in", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_images_bulk(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<BulkCreateImagesRequest>,
) -> ApiResult<(StatusCode, Json<BulkCreateImagesResponse>)> {
    require_admin(user_claims)?;
    data.validate()?;

    let result = ImageService::create_bulk(&app_state.db, data).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Upload an image file into a gallery
#[utoipa::path(
    post,
    path = "/images/upload",
    description = "Stores the file in the media store under the gallery's folder, then records it.",
    tag = "images",
    request_body(content = UploadImageRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Uploaded", body = ImageModel),
        (
            status = 400,
            description = "Missing form fields, not an accepted image, or too large",
            body = ApiErrorResponse,
            example = json!({"error": "Only JPEG, PNG, WebP and GIF images are accepted", "status": 400})
        ),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such gallery", body = ApiErrorResponse),
        (
            status = 502,
            description = "Media store failed",
            body = ApiErrorResponse,
            example = json!({"error": "Media store unavailable", "status": 502})
        )
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_image(
    State(app_state): State<AppState>,
    user_claims: Option<Extension<Claims>>,
    upload: BaseMultipart<UploadImageForm, ApiError>,
) -> ApiResult<(StatusCode, Json<ImageModel>)> {
    require_admin(user_claims)?;

    let form = upload.data;
    let input = UploadInput {
        content: form.file.contents.to_vec(),
        file_name: form.file.metadata.file_name,
        alt: form.alt,
        gallery_id: form.gallery_id,
    };

    let image = UploadService::upload(
        &app_state.db,
        app_state.media.as_ref(),
        &app_state.config,
        input,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Update an image
#[utoipa::path(
    put,
    path = "/images/{id}",
    tag = "images",
    params(("id" = i32, Path, description = "Image ID")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Updated", body = ImageWithGallery),
        (status = 400, description = "Invalid data or unknown gallery", body = ApiErrorResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such image", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_image(
    State(app_state): State<AppState>,
    ApiPath(image_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<UpdateImageRequest>,
) -> ApiResult<Json<ImageWithGallery>> {
    require_admin(user_claims)?;
    data.validate()?;

    let image = ImageService::update(&app_state.db, image_id, data).await?;
    Ok(Json(image))
}

/// Delete an image
#[utoipa::path(
    delete,
    path = "/images/{id}",
    description = "The stored file is removed best-effort.",
    tag = "images",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such image", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    ApiPath(image_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(user_claims)?;

    ImageService::delete(&app_state.db, app_state.media.as_ref(), image_id).await?;
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}
