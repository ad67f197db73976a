use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::path::Path;
use uuid::Uuid;

use crate::{
    config::Config,
    entities::{GalleryEntity, ImageActiveModel, ImageModel},
    errors::{ApiError, ApiResult},
    services::{database::DatabaseConnection, media::inspect_image, MediaStore},
};

/// A received file on its way into a gallery
#[derive(Debug)]
pub struct UploadInput {
    pub content: Vec<u8>,
    /// Client-supplied file name, only used for the default alt text
    pub file_name: Option<String>,
    pub alt: Option<String>,
    pub gallery_id: i32,
}

pub struct UploadService;

impl UploadService {
    /// Gallery check, payload inspection, remote upload, then the row insert.
    ///
    /// Nothing is written to the database unless the media store accepted the
    /// object. If the insert fails afterwards the object stays in the store.
    pub async fn upload(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        config: &Config,
        input: UploadInput,
    ) -> ApiResult<ImageModel> {
        let gallery = GalleryEntity::find_by_id(input.gallery_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Gallery not found".to_string()))?;

        let info = inspect_image(&input.content, config.upload.max_bytes)?;
        let key = Self::object_key(&config.s3.root_folder, &gallery.slug, &info.format);

        let stored = media.put_object(&key, input.content, info.mime).await?;
        tracing::info!(
            "Uploaded {} ({}x{}, {} bytes) to gallery '{}'",
            stored.key,
            info.width,
            info.height,
            stored.size,
            gallery.slug
        );

        let alt = input
            .alt
            .filter(|alt| !alt.trim().is_empty())
            .or_else(|| input.file_name.as_deref().and_then(Self::default_alt));

        let now = Utc::now();
        ImageActiveModel {
            url: Set(stored.url),
            external_id: Set(Some(stored.key.clone())),
            alt: Set(alt),
            title: Set(None),
            description: Set(None),
            width: Set(Some(info.width as i32)),
            height: Set(Some(info.height as i32)),
            size: Set(Some(stored.size)),
            format: Set(Some(info.format)),
            gallery_id: Set(gallery.id),
            featured: Set(false),
            order: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(
                "Image row insert failed after upload, media object {} is orphaned: {}",
                stored.key,
                e
            );
            ApiError::Database(format!("Failed to save uploaded image: {e}"))
        })
    }

    /// `{root}/{gallery-slug}/{uuid}.{ext}`
    pub fn object_key(root_folder: &str, gallery_slug: &str, extension: &str) -> String {
        let root = root_folder.trim_matches('/');
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        if root.is_empty() {
            format!("{gallery_slug}/{name}")
        } else {
            format!("{root}/{gallery_slug}/{name}")
        }
    }

    /// File name with its last extension stripped.
    pub fn default_alt(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::trim)
            .filter(|stem| !stem.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_namespaced_by_gallery() {
        let key = UploadService::object_key("photography/", "sunset", "jpg");
        assert!(key.starts_with("photography/sunset/"));
        assert!(key.ends_with(".jpg"));

        let bare = UploadService::object_key("", "sunset", "png");
        assert!(bare.starts_with("sunset/"));
    }

    #[test]
    fn default_alt_strips_only_the_last_extension() {
        assert_eq!(
            UploadService::default_alt("beach.day.jpg").as_deref(),
            Some("beach.day")
        );
        assert_eq!(UploadService::default_alt("IMG_0042.PNG").as_deref(), Some("IMG_0042"));
        assert_eq!(UploadService::default_alt(""), None);
    }
}
