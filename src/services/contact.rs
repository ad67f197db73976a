use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

use crate::{
    entities::{contact, ContactActiveModel, ContactEntity, ContactModel, ContactStatus},
    errors::{ApiError, ApiResult},
    schemas::contact::{ContactListQuery, CreateContactRequest},
    services::database::DatabaseConnection,
};

pub struct ContactService;

impl ContactService {
    pub async fn create(
        db: &DatabaseConnection,
        data: CreateContactRequest,
    ) -> ApiResult<ContactModel> {
        let now = Utc::now();
        let created = ContactActiveModel {
            name: Set(data.name),
            email: Set(data.email),
            subject: Set(data.subject),
            message: Set(data.message),
            status: Set(ContactStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to store contact message: {}", e);
            ApiError::Database(format!("Failed to store contact message: {e}"))
        })?;

        tracing::info!("New contact message {} from {}", created.id, created.email);
        Ok(created)
    }

    /// Newest first.
    pub async fn list(
        db: &DatabaseConnection,
        query: &ContactListQuery,
    ) -> ApiResult<Vec<ContactModel>> {
        let mut select = ContactEntity::find();
        if let Some(status) = query.status {
            select = select.filter(contact::Column::Status.eq(status));
        }

        select
            .order_by_desc(contact::Column::CreatedAt)
            .limit(query.limit)
            .all(db.as_ref())
            .await
            .map_err(Into::into)
    }

    /// Opening a pending message marks it as read.
    pub async fn get(db: &DatabaseConnection, contact_id: i32) -> ApiResult<ContactModel> {
        let message = Self::find(db, contact_id).await?;

        if message.status != ContactStatus::Pending {
            return Ok(message);
        }

        let mut active: ContactActiveModel = message.into();
        active.status = Set(ContactStatus::Read);
        active.updated_at = Set(Utc::now());
        active.update(db.as_ref()).await.map_err(Into::into)
    }

    pub async fn update_status(
        db: &DatabaseConnection,
        contact_id: i32,
        status: ContactStatus,
    ) -> ApiResult<ContactModel> {
        let message = Self::find(db, contact_id).await?;

        let mut active: ContactActiveModel = message.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        active.update(db.as_ref()).await.map_err(Into::into)
    }

    pub async fn delete(db: &DatabaseConnection, contact_id: i32) -> ApiResult<()> {
        let message = Self::find(db, contact_id).await?;
        message.delete(db.as_ref()).await?;
        Ok(())
    }

    async fn find(db: &DatabaseConnection, contact_id: i32) -> ApiResult<ContactModel> {
        ContactEntity::find_by_id(contact_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Contact message not found".to_string()))
    }
}
