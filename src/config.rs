use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub s3: S3Config,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connect_timeout: u64,
    pub acquire_timeout: u64,
    pub idle_timeout: u64,
    /// Create missing tables from the entity definitions at boot
    pub auto_schema: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Public site origin, used for absolute links in the sitemap
    pub site_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret required to create an admin account
    pub registration_key: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// CDN base for object URLs; falls back to `{endpoint}/{bucket}`
    pub public_url: Option<String>,
    pub root_folder: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

const MIN_REGISTRATION_KEY_LEN: usize = 8;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?,
            min_connections: env_or("DB_MIN_CONNECTIONS", 5),
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            connect_timeout: env_or("DB_CONNECT_TIMEOUT", 10),
            acquire_timeout: env_or("DB_ACQUIRE_TIMEOUT", 10),
            idle_timeout: env_or("DB_IDLE_TIMEOUT", 600),
            auto_schema: env_or("DB_AUTO_SCHEMA", false),
        };

        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a port number")?;
        let server = ServerConfig {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}"))
                .trim_end_matches('/')
                .to_string(),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            expiration: env_or("JWT_EXPIRATION", 7 * 24 * 3600),
        };

        let auth = AuthConfig {
            registration_key: std::env::var("ADMIN_REGISTRATION_KEY")
                .context("ADMIN_REGISTRATION_KEY is not set")?,
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
        };
        if auth.registration_key.len() < MIN_REGISTRATION_KEY_LEN {
            bail!("ADMIN_REGISTRATION_KEY must be at least {MIN_REGISTRATION_KEY_LEN} characters");
        }

        let s3 = S3Config {
            endpoint_url: std::env::var("S3_ENDPOINT_URL").context("S3_ENDPOINT_URL is not set")?,
            access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY is not set")?,
            secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY is not set")?,
            bucket: std::env::var("S3_BUCKET").context("S3_BUCKET is not set")?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_url: std::env::var("S3_PUBLIC_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            root_folder: std::env::var("S3_ROOT_FOLDER")
                .unwrap_or_else(|_| "photography".to_string()),
        };

        let upload = UploadConfig {
            max_bytes: env_or("UPLOAD_MAX_BYTES", 10 * 1024 * 1024),
        };

        Ok(Config {
            database,
            server,
            jwt,
            auth,
            s3,
            upload,
        })
    }
}
