use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    entities::{setting, SettingActiveModel, SettingEntity, SettingModel},
    errors::ApiResult,
    schemas::settings::UpsertSettingRequest,
    services::database::DatabaseConnection,
};

pub struct SettingsService;

impl SettingsService {
    pub async fn get(db: &DatabaseConnection, key: &str) -> ApiResult<Option<SettingModel>> {
        SettingEntity::find_by_id(key.to_string())
            .one(db.as_ref())
            .await
            .map_err(Into::into)
    }

    pub async fn list(db: &DatabaseConnection) -> ApiResult<Vec<SettingModel>> {
        SettingEntity::find()
            .order_by_asc(setting::Column::Key)
            .all(db.as_ref())
            .await
            .map_err(Into::into)
    }

    /// Insert or overwrite by key. A missing description keeps the stored one.
    pub async fn upsert(
        db: &DatabaseConnection,
        data: UpsertSettingRequest,
    ) -> ApiResult<SettingModel> {
        let saved = match Self::get(db, &data.key).await? {
            Some(existing) => {
                let mut active: SettingActiveModel = existing.into();
                active.value = Set(data.value);
                if let Some(description) = data.description {
                    active.description = Set(Some(description));
                }
                active.update(db.as_ref()).await?
            }
            None => {
                SettingActiveModel {
                    key: Set(data.key),
                    value: Set(data.value),
                    description: Set(data.description),
                }
                .insert(db.as_ref())
                .await?
            }
        };

        tracing::debug!("Saved setting '{}'", saved.key);
        Ok(saved)
    }
}
