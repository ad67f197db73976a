use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::ContactStatus;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Maria")]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    #[schema(example = "Wedding in June")]
    pub subject: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    #[schema(example = "Are you available on the 14th of June?")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactCreatedResponse {
    #[schema(example = "Message sent successfully")]
    pub message: String,
    #[schema(example = 12)]
    pub id: i32,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    #[serde(default)]
    pub status: Option<ContactStatus>,
    #[param(minimum = 1)]
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub status: ContactStatus,
}
