pub mod config;
pub mod entities;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod schemas;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::handlers::{admin, auth, categories, contact, galleries, health, images, settings, site};
use crate::middleware::{http_logging_middleware, optional_auth_middleware};
use crate::services::auth::SecurityAddon;
use crate::services::database::DatabaseConnection;
use crate::services::MediaStore;

/// Room for multipart boundaries and the text fields around the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection, media: Arc<dyn MediaStore>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            media,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        categories::list_categories,
        categories::get_category,
        categories::get_category_by_slug,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        galleries::list_galleries,
        galleries::get_featured_gallery,
        galleries::get_gallery,
        galleries::get_gallery_by_slug,
        galleries::create_gallery,
        galleries::update_gallery,
        galleries::delete_gallery,
        images::list_images,
        images::get_image,
        images::create_image,
        images::create_images_bulk,
        images::upload_image,
        images::update_image,
        images::delete_image,
        contact::create_contact,
        contact::list_contacts,
        contact::get_contact,
        contact::update_contact,
        contact::delete_contact,
        settings::get_settings,
        settings::upsert_setting,
        admin::get_stats,
        health::health_check,
        site::sitemap,
        site::robots
    ),
    components(
        schemas(
            entities::CategoryModel,
            entities::GalleryModel,
            entities::ImageModel,
            entities::ContactModel,
            entities::ContactStatus,
            entities::SettingModel,
            entities::RoleEnum,
            schemas::MessageResponse,
            schemas::auth::AuthToken,
            schemas::auth::RegisterRequest,
            schemas::auth::RegisterResponse,
            schemas::auth::LoginRequest,
            schemas::auth::UserProfile,
            schemas::categories::CreateCategoryRequest,
            schemas::categories::UpdateCategoryRequest,
            schemas::categories::CategoryWithCount,
            schemas::categories::CategoryDetail,
            schemas::galleries::CreateGalleryRequest,
            schemas::galleries::UpdateGalleryRequest,
            schemas::galleries::GalleryListItem,
            schemas::galleries::GalleryDetail,
            schemas::galleries::GalleryWithCategory,
            schemas::galleries::FeaturedGallery,
            schemas::images::CreateImageRequest,
            schemas::images::BulkCreateImagesRequest,
            schemas::images::BulkCreateImagesResponse,
            schemas::images::UpdateImageRequest,
            schemas::images::ImageWithGallery,
            schemas::images::UploadImageRequest,
            schemas::contact::CreateContactRequest,
            schemas::contact::ContactCreatedResponse,
            schemas::contact::UpdateContactRequest,
            schemas::settings::UpsertSettingRequest,
            schemas::settings::SettingsResponse,
            schemas::admin::DashboardStats,
            schemas::admin::PopularGallery,
            schemas::admin::RecentGallery,
            schemas::admin::HealthResponse,
            crate::errors::ApiErrorResponse,
            crate::errors::FieldError
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin accounts and tokens"),
        (name = "categories", description = "Gallery categories"),
        (name = "galleries", description = "Photo galleries"),
        (name = "images", description = "Gallery images and uploads"),
        (name = "contact", description = "Contact form intake and triage"),
        (name = "settings", description = "Keyed site settings"),
        (name = "admin", description = "Dashboard"),
        (name = "health", description = "Liveness probe"),
        (name = "site", description = "Crawler files")
    )
)]
pub struct ApiDoc;

pub fn create_app(app_state: AppState) -> Router {
    let upload_limit = app_state.config.upload.max_bytes + MULTIPART_OVERHEAD;

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/slug/{slug}",
            get(categories::get_category_by_slug),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/galleries",
            get(galleries::list_galleries).post(galleries::create_gallery),
        )
        .route("/galleries/featured", get(galleries::get_featured_gallery))
        .route("/galleries/slug/{slug}", get(galleries::get_gallery_by_slug))
        .route(
            "/galleries/{id}",
            get(galleries::get_gallery)
                .put(galleries::update_gallery)
                .delete(galleries::delete_gallery),
        )
        .route("/images", get(images::list_images).post(images::create_image))
        .route("/images/bulk", post(images::create_images_bulk))
        .route(
            "/images/upload",
            post(images::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/images/{id}",
            get(images::get_image)
                .put(images::update_image)
                .delete(images::delete_image),
        )
        .route(
            "/contact",
            get(contact::list_contacts).post(contact::create_contact),
        )
        .route(
            "/contact/{id}",
            get(contact::get_contact)
                .put(contact::update_contact)
                .delete(contact::delete_contact),
        )
        .route(
            "/settings",
            get(settings::get_settings).post(settings::upsert_setting),
        )
        .route("/admin/stats", get(admin::get_stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            optional_auth_middleware,
        ));

    api
        .route("/health", get(health::health_check))
        .route("/sitemap.xml", get(site::sitemap))
        .route("/robots.txt", get(site::robots))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(axum_middleware::from_fn(http_logging_middleware))
        .layer(CorsLayer::permissive())
}
