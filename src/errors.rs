use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_typed_multipart::TypedMultipartError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    #[schema(example = "Gallery not found")]
    pub error: String,
    /// HTTP status code
    #[schema(example = 404)]
    pub status: u16,
    /// Field-level validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "slug")]
    pub field: String,
    #[schema(example = "Slug is required")]
    pub message: String,
}

#[derive(Error, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "message")]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details) = match self {
            ApiError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                ("Database error".to_string(), None)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            ApiError::Upstream(msg) => {
                tracing::error!("Media store error: {}", msg);
                ("Media store unavailable".to_string(), None)
            }
            ApiError::Validation(fields) => ("Invalid data".to_string(), Some(fields)),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (msg, None),
        };

        let body = Json(ApiErrorResponse {
            error,
            status: status.as_u16(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors("", &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::Validation(vec![FieldError {
                field: rejected_field(&message, "body"),
                message,
            }]),
            _ => ApiError::BadRequest(message),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        ApiError::Validation(vec![FieldError {
            field: rejected_field(&message, "query"),
            message,
        }])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<TypedMultipartError> for ApiError {
    fn from(err: TypedMultipartError) -> Self {
        let message = err.to_string();
        match err {
            TypedMultipartError::MissingField { field_name }
            | TypedMultipartError::WrongFieldType { field_name, .. }
            | TypedMultipartError::DuplicateField { field_name }
            | TypedMultipartError::UnknownField { field_name }
            | TypedMultipartError::InvalidEnumValue { field_name, .. } => {
                ApiError::Validation(vec![FieldError {
                    field: field_name,
                    message,
                }])
            }
            TypedMultipartError::Other { .. } => ApiError::Internal(message),
            _ => ApiError::BadRequest(message),
        }
    }
}

/// Picks the field a deserializer complaint is about, e.g. `images[0].url` from
/// "...: images[0]: missing field `url` at line 1 column 30".
fn rejected_field(message: &str, fallback: &str) -> String {
    let detail = message.split_once(": ").map_or(message, |(_, rest)| rest);
    let (path, detail) = match detail.split_once(": ") {
        Some((path, rest)) if !path.contains(' ') => (Some(path), rest),
        _ => (None, detail),
    };
    let missing = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name);

    match (path, missing) {
        (Some(path), Some(name)) => format!("{path}.{name}"),
        (Some(path), None) => path.to_string(),
        (None, Some(name)) => name.to_string(),
        (None, None) => fallback.to_string(),
    }
}

/// Flattens nested errors into dotted paths such as `images[2].url`.
fn collect_field_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<FieldError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn validation_errors_keep_field_names_and_messages() {
        let probe = Probe {
            name: String::new(),
            email: "nope".to_string(),
        };
        let err: ApiError = probe.validate().unwrap_err().into();
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[1].message, "Name is required");
    }

    #[test]
    fn deserializer_messages_name_the_field() {
        let cases = [
            (
                "Failed to deserialize the JSON body into the target type: missing field `slug` at line 1 column 18",
                "slug",
            ),
            (
                "Failed to deserialize the JSON body into the target type: categoryId: invalid type: string \"x\", expected i32 at line 1 column 40",
                "categoryId",
            ),
            (
                "Failed to deserialize the JSON body into the target type: images[0]: missing field `url` at line 1 column 30",
                "images[0].url",
            ),
            (
                "Failed to deserialize the JSON body into the target type: invalid type: integer `3`, expected a map",
                "body",
            ),
        ];

        for (message, field) in cases {
            assert_eq!(rejected_field(message, "body"), field, "{message}");
        }
    }

    #[test]
    fn missing_multipart_field_is_a_validation_error() {
        let err: ApiError = TypedMultipartError::MissingField {
            field_name: "galleryId".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].field, "galleryId");
        assert_eq!(fields[0].message, "field 'galleryId' is required");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            ApiError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Upstream("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
