use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    errors::{ApiErrorResponse, ApiResult},
    extract::ApiJson,
    schemas::auth::{AuthToken, LoginRequest, RegisterRequest, RegisterResponse},
    services::auth::AuthService,
    AppState,
};

/// Create an admin account
#[utoipa::path(
    post,
    path = "/auth/register",
    summary = "Register an admin",
    description = "Creates an admin account. Requires the shared registration key configured on the server.",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (
            status = 400,
            description = "Invalid data",
            body = ApiErrorResponse,
            example = json!({
                "error": "Invalid data",
                "status": 400,
                "details": [{"field": "password", "message": "Password must be at least 6 characters"}]
            })
        ),
        (
            status = 403,
            description = "Wrong registration key",
            body = ApiErrorResponse,
            example = json!({"error": "Invalid admin key", "status": 403})
        ),
        (
            status = 409,
            description = "Email or username taken",
            body = ApiErrorResponse,
            example = json!({"error": "A user with this email or username already exists", "status": 409})
        )
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(data): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    data.validate()?;

    let user = AuthService::register(&app_state.db, &app_state.config.auth, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Admin user created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log in
#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "Log in",
    description = "Exchanges a username or email and password for a bearer token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthToken),
        (status = 400, description = "Missing credentials", body = ApiErrorResponse),
        (
            status = 401,
            description = "Wrong credentials",
            body = ApiErrorResponse,
            example = json!({"error": "Invalid credentials", "status": 401})
        )
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(data): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthToken>> {
    data.validate()?;

    let token = AuthService::login(&app_state.db, &app_state.config.jwt, data).await?;
    Ok(Json(token))
}
