//! Application state management

use std::sync::Arc;

use crate::catalog::{CatalogQuery, ContentLocator};
use crate::config::Config;
use crate::storage::S3Client;
use crate::upload::{PartPresignBatcher, UploadSessionCoordinator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    s3_client: S3Client,
    catalog: Arc<dyn CatalogQuery>,
}

impl AppState {
    pub fn new(config: Config, s3_client: S3Client, catalog: Arc<dyn CatalogQuery>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                s3_client,
                catalog,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the S3 client
    pub fn s3_client(&self) -> &S3Client {
        &self.inner.s3_client
    }

    /// Build an upload coordinator. Coordinators are stateless, so a
    /// fresh one per request is free.
    pub fn coordinator(&self) -> UploadSessionCoordinator {
        UploadSessionCoordinator::new(
            self.inner.s3_client.clone(),
            self.inner.config.upload.clone(),
        )
    }

    /// Build a part presign batcher
    pub fn presign_batcher(&self) -> PartPresignBatcher {
        PartPresignBatcher::new(
            self.inner.s3_client.clone(),
            self.inner.config.upload.clone(),
        )
    }

    /// Build a content locator over the catalog
    pub fn locator(&self) -> ContentLocator {
        ContentLocator::new(self.inner.catalog.clone())
    }
}
