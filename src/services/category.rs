use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

use crate::{
    entities::{
        category, gallery, CategoryActiveModel, CategoryEntity, CategoryModel, GalleryEntity,
    },
    errors::{ApiError, ApiResult},
    schemas::categories::{
        CategoryDetail, CategoryListQuery, CategoryWithCount, CreateCategoryRequest,
        UpdateCategoryRequest,
    },
    services::{database::DatabaseConnection, slug, GalleryService},
};

pub struct CategoryService;

impl CategoryService {
    pub async fn list(
        db: &DatabaseConnection,
        query: &CategoryListQuery,
    ) -> ApiResult<Vec<CategoryWithCount>> {
        let mut select = CategoryEntity::find();
        if let Some(featured) = query.featured {
            select = select.filter(category::Column::Featured.eq(featured));
        }

        let categories = select
            .order_by_asc(category::Column::Order)
            .order_by_asc(category::Column::Name)
            .limit(query.limit)
            .all(db.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {}", e);
                ApiError::Database(format!("Failed to list categories: {e}"))
            })?;

        let ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
        let counts = Self::published_gallery_counts(db, ids).await?;

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithCount {
                gallery_count: counts.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect())
    }

    pub async fn get_by_id(db: &DatabaseConnection, category_id: i32) -> ApiResult<CategoryDetail> {
        let category = CategoryEntity::find_by_id(category_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

        Self::with_galleries(db, category).await
    }

    pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> ApiResult<CategoryDetail> {
        let category = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

        Self::with_galleries(db, category).await
    }

    async fn with_galleries(
        db: &DatabaseConnection,
        category: CategoryModel,
    ) -> ApiResult<CategoryDetail> {
        let (galleries, gallery_count) = tokio::try_join!(
            category
                .find_related(GalleryEntity)
                .filter(gallery::Column::Published.eq(true))
                .order_by_asc(gallery::Column::Order)
                .order_by_desc(gallery::Column::CreatedAt)
                .all(db.as_ref()),
            GalleryService::count_in_category(db.as_ref(), category.id)
        )?;

        let galleries = GalleryService::build_list_items(db.as_ref(), galleries, false).await?;

        Ok(CategoryDetail {
            category,
            galleries,
            gallery_count,
        })
    }

    pub async fn create(
        db: &DatabaseConnection,
        data: CreateCategoryRequest,
    ) -> ApiResult<CategoryModel> {
        slug::ensure_slug_available::<CategoryEntity, _>(
            db.as_ref(),
            category::Column::Slug,
            &data.slug,
            "category",
        )
        .await?;

        let now = Utc::now();
        let created = CategoryActiveModel {
            name: Set(data.name),
            slug: Set(data.slug),
            description: Set(data.description),
            cover_image: Set(data.cover_image),
            featured: Set(data.featured),
            order: Set(data.order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {}", e);
            ApiError::Database(format!("Failed to create category: {e}"))
        })?;

        tracing::info!("Created category '{}' (id={})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        category_id: i32,
        data: UpdateCategoryRequest,
    ) -> ApiResult<CategoryModel> {
        let existing = CategoryEntity::find_by_id(category_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

        slug::ensure_slug_change_allowed::<CategoryEntity, _>(
            db.as_ref(),
            category::Column::Slug,
            &existing.slug,
            data.slug.as_deref(),
            "category",
        )
        .await?;

        let mut active: CategoryActiveModel = existing.into();
        if let Some(name) = data.name {
            active.name = Set(name);
        }
        if let Some(slug) = data.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = data.description {
            active.description = Set(Some(description));
        }
        if let Some(cover_image) = data.cover_image {
            active.cover_image = Set(Some(cover_image));
        }
        if let Some(featured) = data.featured {
            active.featured = Set(featured);
        }
        if let Some(order) = data.order {
            active.order = Set(order);
        }
        active.updated_at = Set(Utc::now());

        active.update(db.as_ref()).await.map_err(|e| {
            tracing::error!("Failed to update category {}: {}", category_id, e);
            ApiError::Database(format!("Failed to update category: {e}"))
        })
    }

    /// Refuses while any gallery, published or not, still points at the category.
    pub async fn delete(db: &DatabaseConnection, category_id: i32) -> ApiResult<()> {
        let existing = CategoryEntity::find_by_id(category_id)
            .one(db.as_ref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

        let gallery_count = GalleryService::count_in_category(db.as_ref(), category_id).await?;
        if gallery_count > 0 {
            return Err(ApiError::Conflict(format!(
                "Cannot delete category with existing galleries ({gallery_count})"
            )));
        }

        existing.delete(db.as_ref()).await?;
        tracing::info!("Deleted category {}", category_id);
        Ok(())
    }

    async fn published_gallery_counts(
        db: &DatabaseConnection,
        category_ids: Vec<i32>,
    ) -> ApiResult<HashMap<i32, u64>> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = GalleryEntity::find()
            .select_only()
            .column(gallery::Column::CategoryId)
            .column_as(Expr::col(gallery::Column::Id).count(), "gallery_count")
            .filter(gallery::Column::CategoryId.is_in(category_ids))
            .filter(gallery::Column::Published.eq(true))
            .group_by(gallery::Column::CategoryId)
            .into_tuple::<(i32, i64)>()
            .all(db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(category_id, count)| (category_id, count.max(0) as u64))
            .collect())
    }
}
