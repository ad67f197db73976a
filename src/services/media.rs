use anyhow::Result;
use async_trait::async_trait;
use image::ImageFormat;
use reqwest::{header::CONTENT_TYPE, Client as HttpClient, StatusCode};
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;

use crate::{
    config::S3Config,
    errors::{ApiError, ApiResult},
};

const SIGNATURE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media store answered {status} for {key}")]
    Status { status: StatusCode, key: String },

    #[error("media store rejected the object: {0}")]
    Rejected(String),
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// What the media store hands back after a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Stable identifier, used later for deletion
    pub key: String,
    pub url: String,
    pub size: i64,
}

/// Dimensions and type read from an uploaded payload before it leaves the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Canonical file extension, e.g. `jpg`
    pub format: String,
    pub mime: &'static str,
}

/// Remote image host. Uploads are keyed by the caller; deletion is by the same key.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, MediaError>;

    async fn delete_object(&self, key: &str) -> Result<(), MediaError>;
}

/// Validates an image payload and reads its dimensions without decoding pixels.
pub fn inspect_image(content: &[u8], max_bytes: usize) -> ApiResult<ImageInfo> {
    if content.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    if content.len() > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "Image must not exceed {:.1} MB",
            max_bytes as f64 / (1024.0 * 1024.0)
        )));
    }

    let kind = infer::get(content)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| ApiError::BadRequest("Uploaded file is not an image".to_string()))?;

    let format = image::guess_format(content)
        .map_err(|_| ApiError::BadRequest("Unrecognised image format".to_string()))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif => {}
        _ => {
            return Err(ApiError::BadRequest(
                "Only JPEG, PNG, WebP and GIF images are accepted".to_string(),
            ));
        }
    }

    let (width, height) = image::ImageReader::with_format(Cursor::new(content), format)
        .into_dimensions()
        .map_err(|_| ApiError::BadRequest("Image file is corrupt".to_string()))?;

    Ok(ImageInfo {
        width,
        height,
        format: format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("bin")
            .to_string(),
        mime: kind.mime_type(),
    })
}

/// S3-compatible bucket signed with `rusty-s3`, requests sent through `reqwest`.
pub struct S3MediaStore {
    bucket: Bucket,
    credentials: Credentials,
    http: HttpClient,
    public_base: String,
}

impl S3MediaStore {
    pub fn new(s3_config: &S3Config) -> Result<Self> {
        let endpoint = url::Url::parse(&s3_config.endpoint_url)?;
        let bucket = Bucket::new(
            endpoint,
            UrlStyle::Path,
            s3_config.bucket.clone(),
            s3_config.region.clone(),
        )?;
        let credentials = Credentials::new(&s3_config.access_key, &s3_config.secret_key);
        let public_base = s3_config
            .public_url
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "{}/{}",
                    s3_config.endpoint_url.trim_end_matches('/'),
                    s3_config.bucket
                )
            })
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bucket,
            credentials,
            http: HttpClient::new(),
            public_base,
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, MediaError> {
        let size = body.len() as i64;
        let url = self
            .bucket
            .put_object(Some(&self.credentials), key)
            .sign(SIGNATURE_TTL);

        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::Status {
                status: response.status(),
                key: key.to_string(),
            });
        }

        tracing::debug!("Stored object {} ({} bytes)", key, size);

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<(), MediaError> {
        let url = self
            .bucket
            .delete_object(Some(&self.credentials), key)
            .sign(SIGNATURE_TTL);

        let response = self.http.delete(url).send().await?;

        // S3 answers 204 for deletes, including keys that were already gone
        if !response.status().is_success() {
            return Err(MediaError::Status {
                status: response.status(),
                key: key.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn reads_dimensions_and_format() {
        let info = inspect_image(&png(16, 9), 1024 * 1024).unwrap();
        assert_eq!((info.width, info.height), (16, 9));
        assert_eq!(info.format, "png");
        assert_eq!(info.mime, "image/png");
    }

    #[test]
    fn rejects_oversized_payloads() {
        let err = inspect_image(&png(16, 9), 10).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn rejects_non_images() {
        let err = inspect_image(b"%PDF-1.7 definitely not a photo", 1024).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = inspect_image(&[], 1024).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn public_url_uses_cdn_base_when_configured() {
        let config = S3Config {
            endpoint_url: "https://s3.example.com/".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            bucket: "photos".to_string(),
            region: "auto".to_string(),
            public_url: None,
            root_folder: "photography".to_string(),
        };
        let store = S3MediaStore::new(&config).unwrap();
        assert_eq!(
            store.public_url("photography/sunset/a.jpg"),
            "https://s3.example.com/photos/photography/sunset/a.jpg"
        );

        let cdn = S3MediaStore::new(&S3Config {
            public_url: Some("https://cdn.example.com/".to_string()),
            ..config
        })
        .unwrap();
        assert_eq!(cdn.public_url("k.png"), "https://cdn.example.com/k.png");
    }
}
