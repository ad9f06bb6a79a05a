//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access, including the
//! multipart-upload lifecycle and ranged reads used by the streaming
//! endpoints.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{timeout::TimeoutConfig, Credentials, Region},
    error::ProvideErrorMetadata,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
    Client,
};
use chrono::DateTime;

use crate::config::StorageConfig;
use crate::error::{AppError, Result, StorageError};

use super::types::{
    AbortOutcome, CompletedObject, MultipartUpload, ObjectMetadata, UploadedPart,
};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "lectern",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        // Multi-gigabyte parts and range reads can take hours over slow
        // links; the SDK's default operation timeouts would cut them off.
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.operation_timeout_hours * 3600))
            .operation_attempt_timeout(Duration::from_secs(
                config.operation_timeout_hours * 3600,
            ))
            .build();

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .timeout_config(timeouts)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        // Test connection by checking if bucket exists
        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get object metadata (HEAD request)
    pub async fn head_object(&self, key: &str) -> Result<ObjectMetadata> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false);
                if missing || is_not_found(&e.to_string()) {
                    AppError::Storage(StorageError::ObjectNotFound(key.to_string()))
                } else {
                    AppError::Storage(StorageError::SdkError(format!(
                        "Failed to head object {}: {}",
                        key, e
                    )))
                }
            })?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: response.content_length().unwrap_or(0),
            last_modified: response
                .last_modified()
                .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }

    /// Get an object as a byte stream (full content)
    pub async fn get_object_stream(&self, key: &str) -> Result<ByteStream> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing || is_not_found(&e.to_string()) {
                    AppError::Storage(StorageError::ObjectNotFound(key.to_string()))
                } else {
                    AppError::Storage(StorageError::SdkError(format!(
                        "Failed to get object stream {}: {}",
                        key, e
                    )))
                }
            })?;

        Ok(response.body)
    }

    /// Get a byte range of an object as a stream.
    ///
    /// `start` and `end` are inclusive offsets, matching HTTP Range
    /// semantics. The caller is responsible for validating them against
    /// the object size first.
    pub async fn get_object_range(&self, key: &str, start: u64, end: u64) -> Result<ByteStream> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .range(format!("bytes={}-{}", start, end))
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing || is_not_found(&e.to_string()) {
                    AppError::Storage(StorageError::ObjectNotFound(key.to_string()))
                } else {
                    AppError::Storage(StorageError::SdkError(format!(
                        "Failed to get range {}-{} of {}: {}",
                        start, end, key, e
                    )))
                }
            })?;

        Ok(response.body)
    }

    /// Check if an object exists
    pub async fn object_exists(&self, key: &str) -> Result<bool> {
        match self.head_object(key).await {
            Ok(_) => Ok(true),
            Err(AppError::Storage(StorageError::ObjectNotFound(_))) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Multipart upload lifecycle
    // ========================================================================

    /// Open a multipart upload session for a key
    pub async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<MultipartUpload> {
        let response = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!(
                    "Failed to create multipart upload for {}: {}",
                    key, e
                ))
            })?;

        let upload_id = response
            .upload_id()
            .ok_or_else(|| {
                StorageError::SdkError(format!("No upload ID returned for key {}", key))
            })?
            .to_string();

        tracing::info!(key = %key, upload_id = %upload_id, "Created multipart upload");

        Ok(MultipartUpload {
            upload_id,
            key: key.to_string(),
        })
    }

    /// Generate a time-boxed presigned URL for uploading one part
    pub async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::SdkError(format!("Invalid presign expiry: {}", e))
        })?;

        let presigned = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .presigned(presigning)
            .await
            .map_err(|e| {
                StorageError::SdkError(format!(
                    "Failed to presign part {} of {}: {}",
                    part_number, key, e
                ))
            })?;

        Ok(presigned.uri().to_string())
    }

    /// Finalize a multipart upload.
    ///
    /// Parts must already be sorted ascending by part number; S3 rejects
    /// out-of-order part lists.
    pub async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[UploadedPart],
    ) -> Result<CompletedObject> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        let upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        let response = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(upload)
            .send()
            .await
            .map_err(|e| {
                let code = e.as_service_error().and_then(|se| se.code());
                if is_no_such_upload(code, &e.to_string()) {
                    StorageError::UploadNotFound {
                        key: key.to_string(),
                        upload_id: upload_id.to_string(),
                    }
                } else {
                    StorageError::SdkError(format!(
                        "Failed to complete multipart upload {} for {}: {}",
                        upload_id, key, e
                    ))
                }
            })?;

        tracing::info!(
            key = %key,
            upload_id = %upload_id,
            parts = parts.len(),
            "Completed multipart upload"
        );

        Ok(CompletedObject {
            key: key.to_string(),
            location: response.location().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }

    /// Abort a multipart upload, releasing any uploaded parts.
    ///
    /// Idempotent: aborting a session the store no longer knows about is
    /// success, not failure. Cleanup must never fail because the thing
    /// being cleaned up is already gone.
    pub async fn abort_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
    ) -> Result<AbortOutcome> {
        match self
            .client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(key = %key, upload_id = %upload_id, "Aborted multipart upload");
                Ok(AbortOutcome::Aborted)
            }
            Err(e) => {
                let code = e.as_service_error().and_then(|se| se.code());
                if is_no_such_upload(code, &e.to_string()) {
                    tracing::info!(
                        key = %key,
                        upload_id = %upload_id,
                        "Abort target already gone, treating as success"
                    );
                    Ok(AbortOutcome::AlreadyGone)
                } else {
                    Err(AppError::Storage(StorageError::SdkError(format!(
                        "Failed to abort multipart upload {} for {}: {}",
                        upload_id, key, e
                    ))))
                }
            }
        }
    }
}

/// Whether an SDK error string indicates a missing object
fn is_not_found(error: &str) -> bool {
    error.contains("404") || error.contains("NoSuchKey") || error.contains("NotFound")
}

/// Whether an abort failure means the upload no longer exists
/// (already completed or already aborted).
fn is_no_such_upload(code: Option<&str>, message: &str) -> bool {
    code == Some("NoSuchUpload") || message.contains("NoSuchUpload") || message.contains("404")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_upload_by_error_code() {
        assert!(is_no_such_upload(Some("NoSuchUpload"), "service error"));
        assert!(!is_no_such_upload(Some("AccessDenied"), "service error"));
    }

    #[test]
    fn test_no_such_upload_by_message() {
        assert!(is_no_such_upload(
            None,
            "NoSuchUpload: The specified upload does not exist"
        ));
        assert!(is_no_such_upload(None, "unhandled error (status 404)"));
        assert!(!is_no_such_upload(None, "connection refused"));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found("NoSuchKey: the key does not exist"));
        assert!(is_not_found("service error: 404"));
        assert!(!is_not_found("timeout waiting for response"));
    }
}
