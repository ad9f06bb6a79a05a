//! Configuration management for Lectern Server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    /// SDK operation timeout in hours. Multipart parts and multi-gigabyte
    /// range reads can legitimately take hours over slow links, so the
    /// SDK's short defaults must not apply.
    pub operation_timeout_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// How many parts the client may upload in parallel. Tuned to the
    /// client's network, not server capacity.
    pub max_concurrent_uploads: usize,
    /// Lifetime of presigned part-upload URLs, in seconds. Hours, not
    /// minutes: a 100MB part over a slow link needs the headroom.
    pub part_url_expiry_secs: u64,
}

impl UploadConfig {
    /// Maximum number of part URLs a single batch request may ask for.
    pub fn batch_limit(&self) -> usize {
        self.max_concurrent_uploads * 2
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: "lectern".to_string(),
                access_key: "admin".to_string(),
                secret_key: "password123".to_string(),
                region: Some("us-east-1".to_string()),
                operation_timeout_hours: 6,
            },
            upload: UploadConfig {
                max_concurrent_uploads: 4,
                part_url_expiry_secs: 6 * 3600,
            },
            database: DatabaseConfig {
                url: "sqlite:./lectern.db".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            storage: StorageConfig {
                endpoint: env::var("S3_ENDPOINT")?,
                bucket: env::var("S3_BUCKET")?,
                access_key: env::var("S3_ACCESS_KEY")?,
                secret_key: env::var("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
                operation_timeout_hours: env::var("S3_OPERATION_TIMEOUT_HOURS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(6),
            },
            upload: UploadConfig {
                max_concurrent_uploads: env::var("UPLOAD_MAX_CONCURRENT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(4),
                part_url_expiry_secs: env::var("UPLOAD_PART_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(6 * 3600),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:./lectern.db".to_string()),
            },
        })
    }
}
