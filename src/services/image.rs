use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::{BTreeSet, HashMap};

use crate::{
    entities::{
        category, gallery, image, CategoryEntity, GalleryEntity, ImageActiveModel, ImageEntity,
        ImageModel,
    },
    errors::{ApiError, ApiResult},
    schemas::{
        galleries::GalleryWithCategory,
        images::{
            BulkCreateImagesRequest, BulkCreateImagesResponse, CreateImageRequest,
            ImageListQuery, ImageWithGallery, UpdateImageRequest,
        },
    },
    services::{database::DatabaseConnection, BestEffort, GalleryService, MediaStore},
};

pub struct ImageService;

impl ImageService {
    pub async fn list(
        db: &DatabaseConnection,
        query: &ImageListQuery,
    ) -> ApiResult<Vec<ImageWithGallery>> {
        let mut select = ImageEntity::find();
        if let Some(gallery_id) = query.gallery_id {
            select = select.filter(image::Column::GalleryId.eq(gallery_id));
        }
        if let Some(featured) = query.featured {
            select = select.filter(image::Column::Featured.eq(featured));
        }

        let images = select
            .order_by_asc(image::Column::Order)
            .order_by_desc(image::Column::CreatedAt)
            .limit(query.limit)
            .all(db.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to list images: {}", e);
                ApiError::Database(format!("Failed to list images: {e}"))
            })?;

        Self::attach_galleries(db.as_ref(), images).await
    }

    pub async fn get(db: &DatabaseConnection, image_id: i32) -> ApiResult<ImageWithGallery> {
        let image = Self::find(db, image_id).await?;
        Self::with_gallery(db.as_ref(), image).await
    }

    /// Registers one image that is already hosted somewhere.
    pub async fn create(
        db: &DatabaseConnection,
        data: CreateImageRequest,
    ) -> ApiResult<ImageWithGallery> {
        let exists = GalleryEntity::find_by_id(data.gallery_id)
            .count(db.as_ref())
            .await?
            > 0;
        if !exists {
            return Err(ApiError::BadRequest("Gallery not found".to_string()));
        }

        let created = Self::active_model_from(data)
            .insert(db.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to create image: {}", e);
                ApiError::Database(format!("Failed to create image: {e}"))
            })?;

        Self::with_gallery(db.as_ref(), created).await
    }

    /// All-or-nothing: every referenced gallery must exist before any row is written.
    pub async fn create_bulk(
        db: &DatabaseConnection,
        data: BulkCreateImagesRequest,
    ) -> ApiResult<BulkCreateImagesResponse> {
        let gallery_ids: BTreeSet<i32> = data.images.iter().map(|i| i.gallery_id).collect();

        let found = GalleryEntity::find()
            .filter(gallery::Column::Id.is_in(gallery_ids.iter().copied()))
            .count(db.as_ref())
            .await?;
        if found != gallery_ids.len() as u64 {
            tracing::warn!(
                "Bulk image insert rejected: {} of {} galleries exist",
                found,
                gallery_ids.len()
            );
            return Err(ApiError::BadRequest(
                "One or more galleries not found".to_string(),
            ));
        }

        let count = data.images.len() as u64;
        let models: Vec<ImageActiveModel> =
            data.images.into_iter().map(Self::active_model_from).collect();

        ImageEntity::insert_many(models)
            .exec(db.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Bulk image insert failed: {}", e);
                ApiError::Database(format!("Failed to create images: {e}"))
            })?;

        tracing::info!("Inserted {} images across {} galleries", count, gallery_ids.len());

        Ok(BulkCreateImagesResponse {
            message: format!("{count} images uploaded successfully"),
            count,
        })
    }

    pub async fn update(
        db: &DatabaseConnection,
        image_id: i32,
        data: UpdateImageRequest,
    ) -> ApiResult<ImageWithGallery> {
        let existing = Self::find(db, image_id).await?;

        if let Some(gallery_id) = data.gallery_id {
            let exists = GalleryEntity::find_by_id(gallery_id)
                .count(db.as_ref())
                .await?
                > 0;
            if !exists {
                return Err(ApiError::BadRequest("Gallery not found".to_string()));
            }
        }

        let mut active: ImageActiveModel = existing.into();
        if let Some(url) = data.url {
            active.url = Set(url);
        }
        if let Some(alt) = data.alt {
            active.alt = Set(Some(alt));
        }
        if let Some(title) = data.title {
            active.title = Set(Some(title));
        }
        if let Some(description) = data.description {
            active.description = Set(Some(description));
        }
        if let Some(width) = data.width {
            active.width = Set(Some(width));
        }
        if let Some(height) = data.height {
            active.height = Set(Some(height));
        }
        if let Some(size) = data.size {
            active.size = Set(Some(size));
        }
        if let Some(format) = data.format {
            active.format = Set(Some(format));
        }
        if let Some(gallery_id) = data.gallery_id {
            active.gallery_id = Set(gallery_id);
        }
        if let Some(featured) = data.featured {
            active.featured = Set(featured);
        }
        if let Some(order) = data.order {
            active.order = Set(order);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db.as_ref()).await.map_err(|e| {
            tracing::error!("Failed to update image {}: {}", image_id, e);
            ApiError::Database(format!("Failed to update image: {e}"))
        })?;

        Self::with_gallery(db.as_ref(), updated).await
    }

    /// Removes the row, then the remote object if there is one. A failed
    /// remote removal is logged and leaves the object behind.
    pub async fn delete(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        image_id: i32,
    ) -> ApiResult<()> {
        let existing = Self::find(db, image_id).await?;
        let external_id = existing.external_id.clone();

        existing.delete(db.as_ref()).await?;
        tracing::info!("Deleted image {}", image_id);

        if let Some(key) = external_id {
            BestEffort::from_result(media.delete_object(&key).await)
                .warn_on_failure(&format!("removal of media object {key}"));
        }

        Ok(())
    }

    async fn find(db: &DatabaseConnection, image_id: i32) -> ApiResult<ImageModel> {
        ImageEntity::find_by_id(image_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))
    }

    fn active_model_from(data: CreateImageRequest) -> ImageActiveModel {
        let now = Utc::now();
        ImageActiveModel {
            url: Set(data.url),
            external_id: Set(None),
            alt: Set(data.alt),
            title: Set(data.title),
            description: Set(data.description),
            width: Set(data.width),
            height: Set(data.height),
            size: Set(data.size),
            format: Set(data.format),
            gallery_id: Set(data.gallery_id),
            featured: Set(data.featured),
            order: Set(data.order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    async fn with_gallery<C: ConnectionTrait>(
        db: &C,
        image: ImageModel,
    ) -> ApiResult<ImageWithGallery> {
        Self::attach_galleries(db, vec![image])
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal("Image lookup returned nothing".to_string()))
    }

    async fn attach_galleries<C: ConnectionTrait>(
        db: &C,
        images: Vec<ImageModel>,
    ) -> ApiResult<Vec<ImageWithGallery>> {
        if images.is_empty() {
            return Ok(vec![]);
        }

        let gallery_ids: BTreeSet<i32> = images.iter().map(|i| i.gallery_id).collect();
        let galleries = GalleryEntity::find()
            .filter(gallery::Column::Id.is_in(gallery_ids))
            .all(db)
            .await?;

        let category_ids: BTreeSet<i32> = galleries.iter().map(|g| g.category_id).collect();
        let categories = CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?;

        let category_map = GalleryService::build_category_map(categories);
        let gallery_map: HashMap<i32, GalleryWithCategory> = galleries
            .into_iter()
            .map(|gallery| {
                (
                    gallery.id,
                    GalleryWithCategory {
                        category: category_map.get(&gallery.category_id).cloned(),
                        gallery,
                    },
                )
            })
            .collect();

        Ok(images
            .into_iter()
            .map(|image| ImageWithGallery {
                gallery: gallery_map.get(&image.gallery_id).cloned(),
                image,
            })
            .collect())
    }
}
