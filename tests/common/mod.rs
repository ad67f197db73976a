#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use portfolio_api::{
    config::{
        AuthConfig, Config, DatabaseConfig, JwtConfig, S3Config, ServerConfig, UploadConfig,
    },
    create_app,
    entities::{users, RoleEnum},
    services::{
        auth::AuthService,
        database::{self, DatabaseConnection},
        media::{MediaError, StoredObject},
        MediaStore,
    },
    AppState,
};
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

pub const REGISTRATION_KEY: &str = "let-me-in-please";

/// In-memory media store that remembers what it was asked to do.
#[derive(Default)]
pub struct RecordingMediaStore {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingMediaStore {
    pub fn fail_from_now_on(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, MediaError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected("store offline".to_string()));
        }
        self.uploaded.lock().unwrap().push(key.to_string());
        Ok(StoredObject {
            key: key.to_string(),
            url: format!("https://cdn.test/{key}"),
            size: body.len() as i64,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<(), MediaError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected("store offline".to_string()));
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            connect_timeout: 5,
            acquire_timeout: 5,
            idle_timeout: 600,
            auto_schema: true,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            site_url: "https://photos.test".to_string(),
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiration: 3600,
        },
        auth: AuthConfig {
            registration_key: REGISTRATION_KEY.to_string(),
            bcrypt_cost: 4,
        },
        s3: S3Config {
            endpoint_url: "https://s3.test".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            bucket: "portfolio".to_string(),
            region: "auto".to_string(),
            public_url: Some("https://cdn.test".to_string()),
            root_folder: "photography".to_string(),
        },
        upload: UploadConfig {
            max_bytes: 1024 * 1024,
        },
    }
}

/// A single pooled connection keeps every query on the same in-memory database.
pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Arc::new(Database::connect(opt).await.unwrap())
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub media: Arc<RecordingMediaStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = memory_db().await;
        database::create_schema(&db).await.unwrap();
        Self::with_db(db)
    }

    pub fn with_db(db: DatabaseConnection) -> Self {
        let media = Arc::new(RecordingMediaStore::default());
        let state = AppState::new(test_config(), db, media.clone());
        TestApp {
            router: create_app(state.clone()),
            state,
            media,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn token_for(&self, role: RoleEnum) -> String {
        let user = users::Model {
            id: 1,
            username: "lens".to_string(),
            email: "lens@photos.test".to_string(),
            name: "Lens".to_string(),
            hashed_password: String::new(),
            role,
            created_at: Utc::now(),
            last_login: None,
        };
        AuthService::create_access_token(&user, &self.state.config.jwt).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_for(RoleEnum::Admin)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let token = self.admin_token();
        self.call(method, uri, Some(&token), body).await
    }

    pub async fn create_category(&self, slug: &str) -> Value {
        let response = self
            .admin(
                Method::POST,
                "/categories",
                Some(json!({"name": format!("Category {slug}"), "slug": slug})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()
    }

    pub async fn create_gallery(&self, slug: &str, category_id: i64, published: bool) -> Value {
        let response = self
            .admin(
                Method::POST,
                "/galleries",
                Some(json!({
                    "title": format!("Gallery {slug}"),
                    "slug": slug,
                    "categoryId": category_id,
                    "published": published
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()
    }

    pub async fn create_image(&self, gallery_id: i64, url: &str) -> Value {
        let response = self
            .admin(
                Method::POST,
                "/images",
                Some(json!({"url": url, "galleryId": gallery_id})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()
    }
}

/// Tiny PNG produced with the same decoder the upload path inspects with.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Builds a `multipart/form-data` request for `/images/upload`.
pub fn upload_request(
    token: &str,
    file_name: &str,
    content: &[u8],
    gallery_id: i64,
    alt: Option<&str>,
) -> Request<Body> {
    const BOUNDARY: &str = "portfolio-test-boundary";
    let mut body = Vec::new();

    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"galleryId\"\r\n\r\n{gallery_id}\r\n"
        )
        .as_bytes(),
    );
    if let Some(alt) = alt {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"alt\"\r\n\r\n{alt}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/images/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
