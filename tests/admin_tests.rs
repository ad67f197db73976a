mod common;

use axum::http::{header, Method, StatusCode};
use common::{memory_db, TestApp, REGISTRATION_KEY};
use portfolio_api::{schemas::admin::DashboardStats, services::StatsService};
use serde_json::json;
use tokio_test::assert_ok;

#[tokio::test]
async fn dashboard_counts_and_ranks() {
    let app = TestApp::spawn().await;
    let category = app.create_category("wedding").await;
    let category_id = category["id"].as_i64().unwrap();
    let popular = app.create_gallery("popular", category_id, true).await;
    app.create_gallery("quiet", category_id, true).await;
    app.create_image(popular["id"].as_i64().unwrap(), "https://img.test/a.jpg")
        .await;
    for _ in 0..3 {
        app.get("/galleries/slug/popular").await;
    }
    app.get("/galleries/slug/quiet").await;
    app.call(
        Method::POST,
        "/contact",
        None,
        Some(json!({
            "name": "Maria",
            "email": "maria@example.com",
            "subject": "Hello",
            "message": "Lovely pictures, thank you!"
        })),
    )
    .await;

    let response = app.admin(Method::GET, "/admin/stats", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let stats: DashboardStats = serde_json::from_str(&response.text).unwrap();
    assert_eq!(stats.total_categories, 1);
    assert_eq!(stats.total_galleries, 2);
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.total_contacts, 1);
    assert_eq!(stats.pending_contacts, 1);
    assert_eq!(stats.recent_galleries, 2);
    assert_eq!(stats.total_views, 4);
    assert_eq!(stats.popular_galleries[0].title, "Gallery popular");
    assert_eq!(stats.popular_galleries[0].views, 3);
    assert_eq!(stats.popular_galleries[0].image_count, 1);
    assert_eq!(stats.popular_galleries[0].category, "Category wedding");
    assert_eq!(stats.recent_galleries_list.len(), 2);
}

#[tokio::test]
async fn dashboard_degrades_to_zero_without_tables() {
    // No schema at all: every underlying query fails
    let app = TestApp::with_db(memory_db().await);

    let response = app.admin(Method::GET, "/admin/stats", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let stats: DashboardStats = serde_json::from_str(&response.text).unwrap();
    assert_eq!(stats, DashboardStats::default());

    assert_eq!(
        StatsService::dashboard(app.db()).await,
        DashboardStats::default()
    );
}

#[tokio::test]
async fn dashboard_is_admin_only() {
    let app = TestApp::spawn().await;
    assert_eq!(
        app.get("/admin/stats").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["environment"], "test");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn register_then_login() {
    let app = TestApp::spawn().await;
    let account = json!({
        "username": "lens",
        "email": "lens@photos.test",
        "password": "secret-pass",
        "name": "Lens Owner",
        "adminKey": REGISTRATION_KEY
    });

    let created = app
        .call(Method::POST, "/auth/register", None, Some(account.clone()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    let body = created.json();
    assert_eq!(body["user"]["role"], "ADMIN");
    assert!(body["user"].get("hashedPassword").is_none());

    let duplicate = app
        .call(Method::POST, "/auth/register", None, Some(account))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let login = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"usernameOrEmail": "lens@photos.test", "password": "secret-pass"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.text);
    let token = login.json()["accessToken"].as_str().unwrap().to_string();
    assert_ok!(portfolio_api::services::auth::AuthService::verify_token(
        &token,
        &app.state.config.jwt
    ));

    let created = app
        .call(
            Method::POST,
            "/categories",
            Some(&token),
            Some(json!({"name": "Wedding", "slug": "wedding"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let wrong = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"usernameOrEmail": "lens", "password": "wrong-pass"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json()["error"], "Invalid credentials");
}

#[tokio::test]
async fn register_requires_the_shared_key() {
    let app = TestApp::spawn().await;

    let response = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "intruder",
                "email": "intruder@example.com",
                "password": "secret-pass",
                "name": "Intruder",
                "adminKey": "guess"
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "Invalid admin key");
}

#[tokio::test]
async fn sitemap_lists_public_pages() {
    let app = TestApp::spawn().await;
    let category = app.create_category("wedding").await;
    let category_id = category["id"].as_i64().unwrap();
    app.create_gallery("sunset", category_id, true).await;
    app.create_gallery("draft", category_id, false).await;

    let response = app.get("/sitemap.xml").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "application/xml"
    );
    assert!(response.text.contains("<loc>https://photos.test</loc>"));
    assert!(response.text.contains("<loc>https://photos.test/galleries/sunset</loc>"));
    assert!(response.text.contains("<loc>https://photos.test/categories/wedding</loc>"));
    assert!(!response.text.contains("/galleries/draft"));
}

#[tokio::test]
async fn sitemap_falls_back_to_static_pages() {
    let app = TestApp::with_db(memory_db().await);

    let response = app.get("/sitemap.xml").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text.matches("<url>").count(), 5);
}

#[tokio::test]
async fn robots_and_docs_are_served() {
    let app = TestApp::spawn().await;

    let robots = app.get("/robots.txt").await;
    assert_eq!(robots.status, StatusCode::OK);
    assert!(robots.text.contains("Sitemap: https://photos.test/sitemap.xml"));

    let openapi = app.get("/openapi.json").await;
    assert_eq!(openapi.status, StatusCode::OK);
    assert!(openapi.json()["paths"]["/images/upload"]["post"].is_object());
}
