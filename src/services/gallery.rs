use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::{
    entities::{
        category, gallery, image, CategoryEntity, CategoryModel, GalleryActiveModel,
        GalleryEntity, GalleryModel, ImageEntity, ImageModel,
    },
    errors::{ApiError, ApiResult},
    schemas::galleries::{
        CreateGalleryRequest, FeaturedGallery, GalleryDetail, GalleryListItem, GalleryListQuery,
        UpdateGalleryRequest,
    },
    services::{database::DatabaseConnection, slug, BestEffort, MediaStore},
};

const FEATURED_IMAGE_LIMIT: u64 = 6;

/// How a single gallery is being looked up
#[derive(Debug, Clone, Copy)]
pub enum GalleryLookup<'a> {
    Id(i32),
    Slug(&'a str),
}

pub struct GalleryService;

impl GalleryService {
    /// Published galleries by default. `include_unpublished` lets an admin drop that filter.
    pub async fn list(
        db: &DatabaseConnection,
        query: &GalleryListQuery,
        include_unpublished: bool,
    ) -> ApiResult<Vec<GalleryListItem>> {
        let mut select = GalleryEntity::find();

        if let Some(category_id) = query.category_id {
            select = select.filter(gallery::Column::CategoryId.eq(category_id));
        }
        if let Some(featured) = query.featured {
            select = select.filter(gallery::Column::Featured.eq(featured));
        }
        if !(include_unpublished && query.published == Some(false)) {
            select = select.filter(gallery::Column::Published.eq(true));
        }

        let galleries = select
            .order_by_asc(gallery::Column::Order)
            .order_by_desc(gallery::Column::CreatedAt)
            .limit(query.limit)
            .all(db.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to list galleries: {}", e);
                ApiError::Database(format!("Failed to list galleries: {e}"))
            })?;

        Self::build_list_items(db.as_ref(), galleries, true).await
    }

    /// Fetches one gallery with its category and images and counts the view.
    ///
    /// Unpublished galleries are invisible unless `include_unpublished` is set;
    /// lookups by slug never set it. Admin fetches do not count as views.
    pub async fn get(
        db: &DatabaseConnection,
        lookup: GalleryLookup<'_>,
        include_unpublished: bool,
    ) -> ApiResult<GalleryDetail> {
        let found = match lookup {
            GalleryLookup::Id(id) => GalleryEntity::find_by_id(id).one(db.as_ref()).await?,
            GalleryLookup::Slug(slug) => {
                GalleryEntity::find()
                    .filter(gallery::Column::Slug.eq(slug))
                    .one(db.as_ref())
                    .await?
            }
        };

        let mut model = found
            .filter(|g| g.published || include_unpublished)
            .ok_or_else(|| {
                tracing::debug!("Gallery not visible: {:?}", lookup);
                ApiError::NotFound("Gallery not found".to_string())
            })?;

        // Admin previews are not counted
        if !include_unpublished
            && Self::record_view(db.as_ref(), model.id)
                .await
                .warn_on_failure("view increment")
        {
            model.views += 1;
        }

        let (category, images) = tokio::try_join!(
            model.find_related(CategoryEntity).one(db.as_ref()),
            ImageEntity::find()
                .filter(image::Column::GalleryId.eq(model.id))
                .order_by_asc(image::Column::Order)
                .order_by_asc(image::Column::CreatedAt)
                .all(db.as_ref())
        )?;

        Ok(GalleryDetail {
            gallery: model,
            category,
            images,
        })
    }

    /// Atomic `views = views + 1`. The result may be discarded.
    pub async fn record_view<C: ConnectionTrait>(db: &C, gallery_id: i32) -> BestEffort {
        let result = GalleryEntity::update_many()
            .col_expr(
                gallery::Column::Views,
                Expr::col(gallery::Column::Views).add(1),
            )
            .filter(gallery::Column::Id.eq(gallery_id))
            .exec(db)
            .await
            .map(|_| ())
            .map_err(ApiError::from);

        BestEffort::from_result(result)
    }

    /// Newest featured and published gallery with its first images.
    pub async fn featured(db: &DatabaseConnection) -> ApiResult<FeaturedGallery> {
        let gallery = GalleryEntity::find()
            .filter(gallery::Column::Featured.eq(true))
            .filter(gallery::Column::Published.eq(true))
            .order_by_desc(gallery::Column::CreatedAt)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("No featured gallery".to_string()))?;

        let images = ImageEntity::find()
            .filter(image::Column::GalleryId.eq(gallery.id))
            .order_by_asc(image::Column::Order)
            .limit(FEATURED_IMAGE_LIMIT)
            .all(db.as_ref())
            .await?;

        Ok(FeaturedGallery { gallery, images })
    }

    pub async fn create(
        db: &DatabaseConnection,
        data: CreateGalleryRequest,
    ) -> ApiResult<GalleryListItem> {
        slug::ensure_slug_available::<GalleryEntity, _>(
            db.as_ref(),
            gallery::Column::Slug,
            &data.slug,
            "gallery",
        )
        .await?;
        let category = Self::require_category(db.as_ref(), data.category_id).await?;

        let now = Utc::now();
        let created = GalleryActiveModel {
            title: Set(data.title),
            slug: Set(data.slug),
            description: Set(data.description),
            category_id: Set(data.category_id),
            featured: Set(data.featured),
            published: Set(data.published),
            views: Set(0),
            order: Set(data.order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create gallery: {}", e);
            ApiError::Database(format!("Failed to create gallery: {e}"))
        })?;

        tracing::info!("Created gallery '{}' (id={})", created.slug, created.id);

        Ok(GalleryListItem {
            gallery: created,
            category: Some(category),
            cover_image: None,
            image_count: 0,
        })
    }

    pub async fn update(
        db: &DatabaseConnection,
        gallery_id: i32,
        data: UpdateGalleryRequest,
    ) -> ApiResult<GalleryListItem> {
        let existing = GalleryEntity::find_by_id(gallery_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Gallery not found".to_string()))?;

        slug::ensure_slug_change_allowed::<GalleryEntity, _>(
            db.as_ref(),
            gallery::Column::Slug,
            &existing.slug,
            data.slug.as_deref(),
            "gallery",
        )
        .await?;
        if let Some(category_id) = data.category_id {
            Self::require_category(db.as_ref(), category_id).await?;
        }

        let mut active: GalleryActiveModel = existing.into();
        if let Some(title) = data.title {
            active.title = Set(title);
        }
        if let Some(slug) = data.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = data.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = data.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(featured) = data.featured {
            active.featured = Set(featured);
        }
        if let Some(published) = data.published {
            active.published = Set(published);
        }
        if let Some(order) = data.order {
            active.order = Set(order);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db.as_ref()).await.map_err(|e| {
            tracing::error!("Failed to update gallery {}: {}", gallery_id, e);
            ApiError::Database(format!("Failed to update gallery: {e}"))
        })?;

        Self::build_list_items(db.as_ref(), vec![updated], true)
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal("Updated gallery vanished".to_string()))
    }

    /// Deletes the gallery and its images in one transaction, then removes
    /// the images' remote objects best-effort.
    pub async fn delete(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        gallery_id: i32,
    ) -> ApiResult<()> {
        let existing = GalleryEntity::find_by_id(gallery_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Gallery not found".to_string()))?;

        let object_keys: Vec<String> = ImageEntity::find()
            .select_only()
            .column(image::Column::ExternalId)
            .filter(image::Column::GalleryId.eq(gallery_id))
            .filter(image::Column::ExternalId.is_not_null())
            .into_tuple::<Option<String>>()
            .all(db.as_ref())
            .await?
            .into_iter()
            .flatten()
            .collect();

        let txn = db.begin().await?;
        let removed_images = ImageEntity::delete_many()
            .filter(image::Column::GalleryId.eq(gallery_id))
            .exec(&txn)
            .await?
            .rows_affected;
        existing.delete(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            "Deleted gallery {} with {} images",
            gallery_id,
            removed_images
        );

        for key in &object_keys {
            BestEffort::from_result(media.delete_object(key).await)
                .warn_on_failure(&format!("removal of media object {key}"));
        }

        Ok(())
    }

    /// Attaches cover image, image count and (optionally) category to each gallery.
    pub async fn build_list_items<C: ConnectionTrait>(
        db: &C,
        galleries: Vec<GalleryModel>,
        with_category: bool,
    ) -> ApiResult<Vec<GalleryListItem>> {
        if galleries.is_empty() {
            return Ok(vec![]);
        }

        let gallery_ids: Vec<i32> = galleries.iter().map(|g| g.id).collect();
        let category_ids: Vec<i32> = galleries.iter().map(|g| g.category_id).collect();

        let (images, counts, categories) = tokio::try_join!(
            ImageEntity::find()
                .filter(image::Column::GalleryId.is_in(gallery_ids.clone()))
                .order_by_asc(image::Column::Order)
                .order_by_asc(image::Column::CreatedAt)
                .all(db),
            Self::image_counts(db, gallery_ids.clone()),
            async {
                if with_category {
                    CategoryEntity::find()
                        .filter(category::Column::Id.is_in(category_ids.clone()))
                        .all(db)
                        .await
                } else {
                    Ok(vec![])
                }
            }
        )?;

        let mut cover_map = Self::build_cover_map(images);
        let category_map = Self::build_category_map(categories);

        Ok(galleries
            .into_iter()
            .map(|gallery| GalleryListItem {
                category: category_map.get(&gallery.category_id).cloned(),
                cover_image: cover_map.remove(&gallery.id),
                image_count: counts.get(&gallery.id).copied().unwrap_or(0),
                gallery,
            })
            .collect())
    }

    /// Number of images per gallery; galleries without images are absent.
    pub async fn image_counts<C: ConnectionTrait>(
        db: &C,
        gallery_ids: Vec<i32>,
    ) -> Result<HashMap<i32, u64>, sea_orm::DbErr> {
        let rows = ImageEntity::find()
            .select_only()
            .column(image::Column::GalleryId)
            .column_as(Expr::col(image::Column::Id).count(), "image_count")
            .filter(image::Column::GalleryId.is_in(gallery_ids))
            .group_by(image::Column::GalleryId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(gallery_id, count)| (gallery_id, count.max(0) as u64))
            .collect())
    }

    pub fn build_category_map(categories: Vec<CategoryModel>) -> HashMap<i32, CategoryModel> {
        categories.into_iter().map(|c| (c.id, c)).collect()
    }

    /// Images must arrive sorted; the first one seen per gallery wins.
    fn build_cover_map(images: Vec<ImageModel>) -> HashMap<i32, ImageModel> {
        let mut covers = HashMap::new();
        for image in images {
            covers.entry(image.gallery_id).or_insert(image);
        }
        covers
    }

    async fn require_category<C: ConnectionTrait>(
        db: &C,
        category_id: i32,
    ) -> ApiResult<CategoryModel> {
        CategoryEntity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Category not found".to_string()))
    }

    /// Total galleries in a category regardless of published state.
    pub async fn count_in_category<C: ConnectionTrait>(
        db: &C,
        category_id: i32,
    ) -> Result<u64, sea_orm::DbErr> {
        GalleryEntity::find()
            .filter(gallery::Column::CategoryId.eq(category_id))
            .count(db)
            .await
    }
}
