mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

async fn send_message(app: &TestApp, subject: &str) -> i64 {
    let response = app
        .call(
            Method::POST,
            "/contact",
            None,
            Some(json!({
                "name": "Maria",
                "email": "maria@example.com",
                "subject": subject,
                "message": "Are you available on the 14th of June?"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    let body = response.json();
    assert_eq!(body["message"], "Message sent successfully");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn short_messages_are_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .call(
            Method::POST,
            "/contact",
            None,
            Some(json!({
                "name": "Maria",
                "email": "not-an-email",
                "subject": "Hi",
                "message": "short"
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<String> = response.json()["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["email", "message"]);
}

#[tokio::test]
async fn opening_a_pending_message_marks_it_read() {
    let app = TestApp::spawn().await;
    let id = send_message(&app, "Wedding").await;

    let opened = app
        .admin(Method::GET, &format!("/contact/{id}"), None)
        .await;
    assert_eq!(opened.status, StatusCode::OK);
    assert_eq!(opened.json()["status"], "READ");

    let replied = app
        .admin(
            Method::PUT,
            &format!("/contact/{id}"),
            Some(json!({"status": "REPLIED"})),
        )
        .await;
    assert_eq!(replied.json()["status"], "REPLIED");

    // Only PENDING flips on read
    let reopened = app
        .admin(Method::GET, &format!("/contact/{id}"), None)
        .await;
    assert_eq!(reopened.json()["status"], "REPLIED");
}

#[tokio::test]
async fn inbox_filters_by_status() {
    let app = TestApp::spawn().await;
    let first = send_message(&app, "First").await;
    send_message(&app, "Second").await;
    app.admin(Method::GET, &format!("/contact/{first}"), None)
        .await;

    let pending = app
        .admin(Method::GET, "/contact?status=PENDING", None)
        .await
        .json();
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["subject"], "Second");

    let all = app.admin(Method::GET, "/contact?limit=10", None).await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn inbox_is_admin_only() {
    let app = TestApp::spawn().await;
    let id = send_message(&app, "Private").await;

    assert_eq!(app.get("/contact").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get(&format!("/contact/{id}")).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn missing_messages_are_not_found() {
    let app = TestApp::spawn().await;

    let update = app
        .admin(Method::PUT, "/contact/7", Some(json!({"status": "ARCHIVED"})))
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let id = send_message(&app, "Bye").await;
    let deleted = app
        .admin(Method::DELETE, &format!("/contact/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let again = app
        .admin(Method::DELETE, &format!("/contact/{id}"), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json()["error"], "Contact message not found");
}

#[tokio::test]
async fn settings_upsert_by_key() {
    let app = TestApp::spawn().await;

    let missing = app.get("/settings?key=site_title").await;
    assert_eq!(missing.status, StatusCode::OK);
    assert!(missing.json().is_null());

    let saved = app
        .admin(
            Method::POST,
            "/settings",
            Some(json!({"key": "site_title", "value": "Lens", "description": "Shown in the header"})),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK, "{}", saved.text);

    app.admin(
        Method::POST,
        "/settings",
        Some(json!({"key": "site_title", "value": "Lens Studio"})),
    )
    .await;
    app.admin(
        Method::POST,
        "/settings",
        Some(json!({"key": "about", "value": "Hello"})),
    )
    .await;

    let one = app.get("/settings?key=site_title").await.json();
    assert_eq!(one["value"], "Lens Studio");
    assert_eq!(one["description"], "Shown in the header");

    let all = app.get("/settings").await.json();
    let keys: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["about", "site_title"]);

    let anonymous = app
        .call(
            Method::POST,
            "/settings",
            None,
            Some(json!({"key": "about", "value": "Hacked"})),
        )
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}
