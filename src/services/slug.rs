use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::borrow::Cow;
use validator::ValidationError;

use crate::errors::{ApiError, ApiResult};

const MAX_SLUG_LEN: usize = 100;

/// Lowercase ASCII words joined by single hyphens, e.g. `golden-hour-2024`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        });

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("slug").with_message(Cow::Borrowed(
            "Slug may only contain lowercase letters, digits and single hyphens",
        )))
    }
}

/// Fails with `Conflict` when another row of `E` already uses `slug`.
///
/// Check-then-insert, so two concurrent writers can still race; the unique
/// index on the column is the final arbiter and surfaces as a database error.
pub async fn ensure_slug_available<E, C>(
    db: &C,
    column: E::Column,
    slug: &str,
    what: &str,
) -> ApiResult<()>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let existing = E::find().filter(column.eq(slug)).count(db).await?;

    if existing > 0 {
        tracing::debug!("Slug '{}' already taken by a {}", slug, what);
        return Err(ApiError::Conflict(format!(
            "A {what} with this slug already exists"
        )));
    }

    Ok(())
}

/// Update path: only re-check when the slug is actually changing.
pub async fn ensure_slug_change_allowed<E, C>(
    db: &C,
    column: E::Column,
    current: &str,
    requested: Option<&str>,
    what: &str,
) -> ApiResult<()>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    match requested {
        Some(slug) if slug != current => {
            ensure_slug_available::<E, C>(db, column, slug, what).await
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{category, CategoryEntity};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    /// Row shape of `SELECT COUNT(*) AS num_items`, read back as an i32 on MySQL.
    fn count_result(n: i32) -> Vec<BTreeMap<&'static str, Value>> {
        vec![BTreeMap::from([("num_items", Value::Int(Some(n)))])]
    }

    #[test]
    fn accepts_kebab_case() {
        assert!(validate_slug("sunset").is_ok());
        assert!(validate_slug("golden-hour-2024").is_ok());
    }

    #[test]
    fn rejects_malformed_slugs() {
        let malformed = [
            "",
            "Sunset",
            "two--hyphens",
            "-leading",
            "trailing-",
            "with space",
            "ümlaut",
        ];
        for bad in malformed {
            assert!(validate_slug(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn taken_slug_is_a_conflict() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([count_result(1)])
            .into_connection();

        let err = ensure_slug_available::<CategoryEntity, _>(
            &db,
            category::Column::Slug,
            "wedding",
            "category",
        )
        .await
        .unwrap_err();

        let ApiError::Conflict(message) = err else {
            panic!("expected a conflict, got {err:?}");
        };
        assert_eq!(message, "A category with this slug already exists");
    }

    #[tokio::test]
    async fn free_slug_passes() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([count_result(0)])
            .into_connection();

        tokio_test::assert_ok!(
            ensure_slug_available::<CategoryEntity, _>(
                &db,
                category::Column::Slug,
                "travel",
                "category",
            )
            .await
        );
    }

    #[tokio::test]
    async fn unchanged_slug_skips_the_lookup() {
        // No prepared results: any query would fail
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();

        for requested in [None, Some("wedding")] {
            tokio_test::assert_ok!(
                ensure_slug_change_allowed::<CategoryEntity, _>(
                    &db,
                    category::Column::Slug,
                    "wedding",
                    requested,
                    "category",
                )
                .await
            );
        }
        assert!(db.into_transaction_log().is_empty());
    }
}
