pub mod auth;
pub mod category;
pub mod contact;
pub mod database;
pub mod gallery;
pub mod image;
pub mod media;
pub mod settings;
pub mod site;
pub mod slug;
pub mod stats;
pub mod upload;

pub use category::CategoryService;
pub use contact::ContactService;
pub use gallery::GalleryService;
pub use image::ImageService;
pub use media::{MediaStore, S3MediaStore};
pub use settings::SettingsService;
pub use site::SiteService;
pub use stats::StatsService;
pub use upload::UploadService;

/// Outcome of a side effect whose failure must not fail the surrounding request
/// (view counters, remote object cleanup). Callers may inspect it or drop it.
#[derive(Debug)]
pub struct BestEffort<E = crate::errors::ApiError>(Result<(), E>);

impl<E: std::fmt::Display> BestEffort<E> {
    pub fn from_result(result: Result<(), E>) -> Self {
        BestEffort(result)
    }

    /// Logs a failure at warn level and reports whether the effect happened.
    pub fn warn_on_failure(self, what: &str) -> bool {
        match self.0 {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Best-effort {} failed: {}", what, e);
                false
            }
        }
    }
}
