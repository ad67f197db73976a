use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    entities::{category, gallery, CategoryEntity, GalleryEntity},
    services::database::DatabaseConnection,
};

const STATIC_PAGES: &[(&str, &str, f32)] = &[
    ("", "weekly", 1.0),
    ("/galleries", "weekly", 0.9),
    ("/categories", "weekly", 0.8),
    ("/about", "monthly", 0.6),
    ("/contact", "monthly", 0.6),
];

const ROBOTS_ALLOW: &[&str] = &["/", "/galleries", "/categories", "/about", "/contact"];
const ROBOTS_DISALLOW: &[&str] = &["/admin", "/auth", "/api"];

#[derive(Debug, Clone, PartialEq)]
struct SitemapEntry {
    loc: String,
    last_modified: DateTime<Utc>,
    change_frequency: &'static str,
    priority: f32,
}

pub struct SiteService;

impl SiteService {
    /// Static pages, then published galleries, then categories. A failed
    /// lookup leaves only the static pages.
    pub async fn sitemap(db: &DatabaseConnection, site_url: &str) -> String {
        let base = site_url.trim_end_matches('/');
        let now = Utc::now();

        let mut entries: Vec<SitemapEntry> = STATIC_PAGES
            .iter()
            .map(|(path, change_frequency, priority)| SitemapEntry {
                loc: format!("{base}{path}"),
                last_modified: now,
                change_frequency,
                priority: *priority,
            })
            .collect();

        match Self::dynamic_entries(db, base).await {
            Ok(dynamic) => entries.extend(dynamic),
            Err(e) => tracing::warn!("Sitemap limited to static pages: {}", e),
        }

        render_sitemap(&entries)
    }

    pub fn robots(site_url: &str) -> String {
        let base = site_url.trim_end_matches('/');
        let mut body = String::from("User-agent: *\n");
        for path in ROBOTS_ALLOW {
            body.push_str(&format!("Allow: {path}\n"));
        }
        for path in ROBOTS_DISALLOW {
            body.push_str(&format!("Disallow: {path}\n"));
        }
        body.push_str(&format!("\nSitemap: {base}/sitemap.xml\n"));
        body
    }

    async fn dynamic_entries(
        db: &DatabaseConnection,
        base: &str,
    ) -> Result<Vec<SitemapEntry>, DbErr> {
        let (galleries, categories) = tokio::try_join!(
            GalleryEntity::find()
                .select_only()
                .columns([gallery::Column::Slug, gallery::Column::UpdatedAt])
                .filter(gallery::Column::Published.eq(true))
                .order_by_asc(gallery::Column::Order)
                .into_tuple::<(String, DateTime<Utc>)>()
                .all(db.as_ref()),
            CategoryEntity::find()
                .select_only()
                .columns([category::Column::Slug, category::Column::UpdatedAt])
                .order_by_asc(category::Column::Order)
                .into_tuple::<(String, DateTime<Utc>)>()
                .all(db.as_ref()),
        )?;

        let galleries = galleries.into_iter().map(|(slug, updated)| SitemapEntry {
            loc: format!("{base}/galleries/{slug}"),
            last_modified: updated,
            change_frequency: "monthly",
            priority: 0.8,
        });
        let categories = categories.into_iter().map(|(slug, updated)| SitemapEntry {
            loc: format!("{base}/categories/{slug}"),
            last_modified: updated,
            change_frequency: "monthly",
            priority: 0.7,
        });

        Ok(galleries.chain(categories).collect())
    }
}

fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&entry.loc),
            entry.last_modified.format("%Y-%m-%dT%H:%M:%SZ"),
            entry.change_frequency,
            entry.priority,
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_locations() {
        assert_eq!(escape_xml("a&b<c>'\""), "a&amp;b&lt;c&gt;&apos;&quot;");
    }

    #[test]
    fn renders_one_url_block_per_entry() {
        let entry = SitemapEntry {
            loc: "https://example.com/galleries/a&b".to_string(),
            last_modified: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            change_frequency: "monthly",
            priority: 0.8,
        };
        let xml = render_sitemap(&[entry.clone(), entry]);

        assert!(xml.starts_with("<?xml"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.com/galleries/a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-05-01T10:00:00Z</lastmod>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn robots_points_at_sitemap_and_hides_admin() {
        let robots = SiteService::robots("https://example.com/");
        assert!(robots.contains("Disallow: /admin\n"));
        assert!(robots.contains("Allow: /galleries\n"));
        assert!(robots.ends_with("Sitemap: https://example.com/sitemap.xml\n"));
    }
}
