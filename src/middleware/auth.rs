use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    errors::{ApiError, ApiResult},
    services::auth::{AuthService, Claims},
    AppState,
};

/// Optional authentication middleware - attaches `Claims` when a valid bearer token is present
pub async fn optional_auth_middleware(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match AuthService::verify_token(bearer.token(), &app_state.config.jwt) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(reason) => tracing::debug!("Ignoring bearer token: {}", reason),
        }
    }

    next.run(req).await
}

/// Admin gate for write endpoints: no claims is 401, a non-admin role is 403.
pub fn require_admin(user_claims: Option<Extension<Claims>>) -> ApiResult<Claims> {
    let Extension(claims) = user_claims
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    if !claims.is_admin() {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }

    Ok(claims)
}
