mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn duplicate_category_slug_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.create_category("wedding").await;

    let response = app
        .admin(
            Method::POST,
            "/categories",
            Some(json!({"name": "Weddings again", "slug": "wedding"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.json()["error"],
        "A category with this slug already exists"
    );
}

#[tokio::test]
async fn invalid_slug_is_rejected_with_field_details() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(
            Method::POST,
            "/categories",
            Some(json!({"name": "Portraits", "slug": "Not A Slug"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["details"][0]["field"], "slug");
}

#[tokio::test]
async fn incomplete_body_is_rejected_with_field_details() {
    let app = TestApp::spawn().await;

    let response = app
        .admin(Method::POST, "/categories", Some(json!({"name": "Wedding"})))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "Invalid data");
    assert_eq!(body["status"], 400);
    assert_eq!(body["details"][0]["field"], "slug");
    assert!(body["details"][0]["message"]
        .as_str()
        .unwrap()
        .contains("missing field `slug`"));
}

#[tokio::test]
async fn category_with_galleries_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let category = app.create_category("travel").await;
    let id = category["id"].as_i64().unwrap();
    // Drafts count too
    app.create_gallery("lisbon", id, false).await;

    let blocked = app
        .admin(Method::DELETE, &format!("/categories/{id}"), None)
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(
        blocked.json()["error"],
        "Cannot delete category with existing galleries (1)"
    );

    let empty = app.create_category("empty").await;
    let empty_id = empty["id"].as_i64().unwrap();
    let deleted = app
        .admin(Method::DELETE, &format!("/categories/{empty_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app.get(&format!("/categories/{empty_id}")).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_counts_only_published_galleries() {
    let app = TestApp::spawn().await;
    let category = app.create_category("nature").await;
    let id = category["id"].as_i64().unwrap();
    app.create_gallery("forest", id, true).await;
    app.create_gallery("draft-forest", id, false).await;

    let list = app.get("/categories").await;
    assert_eq!(list.status, StatusCode::OK);
    let body = list.json();
    assert_eq!(body[0]["slug"], "nature");
    assert_eq!(body[0]["galleryCount"], 1);

    let detail = app.get("/categories/slug/nature").await.json();
    assert_eq!(detail["galleries"].as_array().unwrap().len(), 1);
    assert_eq!(detail["galleries"][0]["slug"], "forest");
    assert_eq!(detail["galleryCount"], 2);
}

#[tokio::test]
async fn category_update_is_partial() {
    let app = TestApp::spawn().await;
    let category = app.create_category("street").await;
    let id = category["id"].as_i64().unwrap();

    let response = app
        .admin(
            Method::PUT,
            &format!("/categories/{id}"),
            Some(json!({"slug": "street", "featured": true})),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    let body = response.json();
    assert_eq!(body["name"], "Category street");
    assert_eq!(body["featured"], true);
}

#[tokio::test]
async fn writes_require_an_admin_token() {
    let app = TestApp::spawn().await;
    let body = json!({"name": "Food", "slug": "food"});

    let anonymous = app
        .call(Method::POST, "/categories", None, Some(body.clone()))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .call(Method::POST, "/categories", Some("not-a-jwt"), Some(body.clone()))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let user_token = app.token_for(portfolio_api::entities::RoleEnum::User);
    let user = app
        .call(Method::POST, "/categories", Some(&user_token), Some(body))
        .await;
    assert_eq!(user.status, StatusCode::FORBIDDEN);
}
