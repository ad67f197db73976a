use chrono::{DateTime, Months, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use crate::{
    entities::{
        category, contact, gallery, image, CategoryEntity, ContactEntity, ContactStatus,
        GalleryEntity, GalleryModel, ImageEntity,
    },
    schemas::admin::{DashboardStats, PopularGallery, RecentGallery},
    services::{database::DatabaseConnection, GalleryService},
};

const TOP_GALLERIES: u64 = 5;
const UNCATEGORIZED: &str = "Uncategorized";

pub struct StatsService;

impl StatsService {
    /// Runs every counter concurrently. A failing query contributes its zero
    /// value instead of failing the dashboard, so this never returns an error.
    pub async fn dashboard(db: &DatabaseConnection) -> DashboardStats {
        let conn = db.as_ref();
        let since = Self::last_month(Utc::now());

        let (
            total_categories,
            total_galleries,
            total_images,
            total_contacts,
            recent_categories,
            recent_galleries,
            recent_images,
            recent_contacts,
            pending_contacts,
            total_views,
            top_galleries,
            newest_galleries,
        ) = tokio::join!(
            or_default("category count", CategoryEntity::find().count(conn)),
            or_default("gallery count", GalleryEntity::find().count(conn)),
            or_default("image count", ImageEntity::find().count(conn)),
            or_default("contact count", ContactEntity::find().count(conn)),
            or_default(
                "recent category count",
                CategoryEntity::find()
                    .filter(category::Column::CreatedAt.gte(since))
                    .count(conn)
            ),
            or_default(
                "recent gallery count",
                GalleryEntity::find()
                    .filter(gallery::Column::CreatedAt.gte(since))
                    .count(conn)
            ),
            or_default(
                "recent image count",
                ImageEntity::find()
                    .filter(image::Column::CreatedAt.gte(since))
                    .count(conn)
            ),
            or_default(
                "recent contact count",
                ContactEntity::find()
                    .filter(contact::Column::CreatedAt.gte(since))
                    .count(conn)
            ),
            or_default(
                "pending contact count",
                ContactEntity::find()
                    .filter(contact::Column::Status.eq(ContactStatus::Pending))
                    .count(conn)
            ),
            or_default("total views", Self::total_views(conn)),
            or_default(
                "popular galleries",
                GalleryEntity::find()
                    .order_by_desc(gallery::Column::Views)
                    .limit(TOP_GALLERIES)
                    .all(conn)
            ),
            or_default(
                "recent galleries",
                GalleryEntity::find()
                    .order_by_desc(gallery::Column::CreatedAt)
                    .limit(TOP_GALLERIES)
                    .all(conn)
            ),
        );

        let ids: Vec<i32> = top_galleries
            .iter()
            .chain(newest_galleries.iter())
            .map(|g| g.id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let category_ids: BTreeSet<i32> = top_galleries
            .iter()
            .chain(newest_galleries.iter())
            .map(|g| g.category_id)
            .collect();

        let (category_names, image_counts) = tokio::join!(
            or_default("gallery category names", Self::category_names(conn, category_ids)),
            or_default(
                "gallery image counts",
                GalleryService::image_counts(conn, ids)
            ),
        );

        let describe = |g: &GalleryModel| {
            (
                category_names
                    .get(&g.category_id)
                    .cloned()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                image_counts.get(&g.id).copied().unwrap_or(0),
            )
        };

        let popular_galleries = top_galleries
            .iter()
            .map(|g| {
                let (category, image_count) = describe(g);
                PopularGallery {
                    id: g.id,
                    title: g.title.clone(),
                    category,
                    views: g.views,
                    image_count,
                }
            })
            .collect();

        let recent_galleries_list = newest_galleries
            .iter()
            .map(|g| {
                let (category, image_count) = describe(g);
                RecentGallery {
                    id: g.id,
                    title: g.title.clone(),
                    category,
                    date: g.created_at,
                    image_count,
                }
            })
            .collect();

        DashboardStats {
            total_categories,
            total_galleries,
            total_images,
            total_contacts,
            total_views,
            recent_categories,
            recent_galleries,
            recent_images,
            recent_contacts,
            pending_contacts,
            popular_galleries,
            recent_galleries_list,
        }
    }

    /// Same day of the previous calendar month, clamped to its last day.
    pub fn last_month(now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(1)).unwrap_or(now)
    }

    async fn total_views<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
        let views = GalleryEntity::find()
            .select_only()
            .column(gallery::Column::Views)
            .into_tuple::<i32>()
            .all(db)
            .await?;

        Ok(views.into_iter().map(i64::from).sum())
    }

    async fn category_names<C: ConnectionTrait>(
        db: &C,
        category_ids: BTreeSet<i32>,
    ) -> Result<HashMap<i32, String>, DbErr> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CategoryEntity::find()
            .select_only()
            .column(category::Column::Id)
            .column(category::Column::Name)
            .filter(category::Column::Id.is_in(category_ids))
            .into_tuple::<(i32, String)>()
            .all(db)
            .await?;

        Ok(rows.into_iter().collect())
    }
}

async fn or_default<T, F>(what: &str, query: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, DbErr>>,
{
    query.await.unwrap_or_else(|e| {
        tracing::warn!("Dashboard {} unavailable: {}", what, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_month_steps_back_one_calendar_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(
            StatsService::last_month(now),
            Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn last_month_clamps_to_shorter_months() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(
            StatsService::last_month(now),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }
}
