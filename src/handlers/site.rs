use axum::{extract::State, http::header, response::IntoResponse};

use crate::{services::SiteService, AppState};

/// XML sitemap of the public site
#[utoipa::path(
    get,
    path = "/sitemap.xml",
    tag = "site",
    responses(
        (status = 200, description = "Sitemap", content_type = "application/xml", body = String)
    )
)]
pub async fn sitemap(State(app_state): State<AppState>) -> impl IntoResponse {
    let xml = SiteService::sitemap(&app_state.db, &app_state.config.server.site_url).await;
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

/// Crawler rules
#[utoipa::path(
    get,
    path = "/robots.txt",
    tag = "site",
    responses(
        (status = 200, description = "robots.txt", content_type = "text/plain", body = String)
    )
)]
pub async fn robots(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        SiteService::robots(&app_state.config.server.site_url),
    )
}
