use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    entities::ContactModel,
    errors::{ApiErrorResponse, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::require_admin,
    schemas::{
        contact::{
            ContactCreatedResponse, ContactListQuery, CreateContactRequest, UpdateContactRequest,
        },
        MessageResponse,
    },
    services::{auth::Claims, ContactService},
    AppState,
};

/// Send a message through the contact form
#[utoipa::path(
    post,
    path = "/contact",
    tag = "contact",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactCreatedResponse),
        (
            status = 400,
            description = "Invalid data",
            body = ApiErrorResponse,
            example = json!({
                "error": "Invalid data",
                "status": 400,
                "details": [{"field": "message", "message": "Message must be at least 10 characters"}]
            })
        )
    )
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    ApiJson(data): ApiJson<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<ContactCreatedResponse>)> {
    data.validate()?;

    let message = ContactService::create(&app_state.db, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            message: "Message sent successfully".to_string(),
            id: message.id,
        }),
    ))
}

/// List contact messages
#[utoipa::path(
    get,
    path = "/contact",
    description = "Newest first",
    tag = "contact",
    params(ContactListQuery),
    responses(
        (status = 200, description = "Messages", body = Vec<ContactModel>),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 403, description = "Not an admin", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ContactListQuery>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<Vec<ContactModel>>> {
    require_admin(user_claims)?;

    let messages = ContactService::list(&app_state.db, &query).await?;
    Ok(Json(messages))
}

/// Read a contact message
#[utoipa::path(
    get,
    path = "/contact/{id}",
    description = "A pending message is marked as read when opened.",
    tag = "contact",
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = ContactModel),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (
            status = 404,
            description = "No such message",
            body = ApiErrorResponse,
            example = json!({"error": "Contact message not found", "status": 404})
        )
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    ApiPath(contact_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<ContactModel>> {
    require_admin(user_claims)?;

    let message = ContactService::get(&app_state.db, contact_id).await?;
    Ok(Json(message))
}

/// Change a message's status
#[utoipa::path(
    put,
    path = "/contact/{id}",
    tag = "contact",
    params(("id" = i32, Path, description = "Message ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Updated", body = ContactModel),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such message", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    ApiPath(contact_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
    ApiJson(data): ApiJson<UpdateContactRequest>,
) -> ApiResult<Json<ContactModel>> {
    require_admin(user_claims)?;

    let message = ContactService::update_status(&app_state.db, contact_id, data.status).await?;
    Ok(Json(message))
}

/// Delete a contact message
#[utoipa::path(
    delete,
    path = "/contact/{id}",
    tag = "contact",
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse),
        (status = 404, description = "No such message", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    ApiPath(contact_id): ApiPath<i32>,
    user_claims: Option<Extension<Claims>>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(user_claims)?;

    ContactService::delete(&app_state.db, contact_id).await?;
    Ok(Json(MessageResponse::new("Contact message deleted successfully")))
}
