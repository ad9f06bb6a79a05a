//! Batched part presigning
//!
//! Hands out time-boxed upload URLs for individual parts, singly or in
//! bounded batches. Batches are all-or-nothing: a partially presigned
//! batch would strand the client mid-upload.

use std::time::Duration;

use futures::future::try_join_all;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};
use crate::storage::S3Client;
use crate::upload::chunk_plan::MAX_PARTS;

use super::types::PresignedPart;

/// Issues presigned part-upload URLs for a multipart session
#[derive(Clone)]
pub struct PartPresignBatcher {
    s3: S3Client,
    config: UploadConfig,
}

impl PartPresignBatcher {
    pub fn new(s3: S3Client, config: UploadConfig) -> Self {
        Self { s3, config }
    }

    /// Presign a single part upload URL
    pub async fn presign_one(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
    ) -> Result<PresignedPart> {
        validate_part_number(part_number)?;

        let upload_url = self
            .s3
            .presign_upload_part(key, upload_id, part_number, self.expiry())
            .await?;

        Ok(PresignedPart {
            part_number,
            upload_url,
        })
    }

    /// Presign a batch of part upload URLs concurrently.
    ///
    /// The whole batch is validated up front; any invalid part number
    /// fails the request before a single URL is issued. Batch size is
    /// capped at twice the client concurrency bound.
    pub async fn presign_batch(
        &self,
        key: &str,
        upload_id: &str,
        part_numbers: &[i32],
    ) -> Result<Vec<PresignedPart>> {
        if part_numbers.is_empty() {
            return Err(AppError::BadRequest(
                "partNumbers must be a non-empty array".to_string(),
            ));
        }

        let limit = self.config.batch_limit();
        if part_numbers.len() > limit {
            return Err(AppError::BadRequest(format!(
                "batch of {} exceeds the limit of {} part URLs per request",
                part_numbers.len(),
                limit
            )));
        }

        for &part_number in part_numbers {
            validate_part_number(part_number)?;
        }

        let expiry = self.expiry();
        let urls = try_join_all(part_numbers.iter().map(|&part_number| {
            let s3 = &self.s3;
            async move {
                let upload_url = s3
                    .presign_upload_part(key, upload_id, part_number, expiry)
                    .await?;
                Ok::<_, AppError>(PresignedPart {
                    part_number,
                    upload_url,
                })
            }
        }))
        .await?;

        tracing::debug!(
            key = %key,
            upload_id = %upload_id,
            count = urls.len(),
            "Presigned part batch"
        );

        Ok(urls)
    }

    fn expiry(&self) -> Duration {
        Duration::from_secs(self.config.part_url_expiry_secs)
    }
}

fn validate_part_number(part_number: i32) -> Result<()> {
    if part_number < 1 || part_number as i64 > MAX_PARTS {
        return Err(AppError::BadRequest(format!(
            "partNumber {} is outside [1, {}]",
            part_number, MAX_PARTS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_number_bounds() {
        assert!(validate_part_number(1).is_ok());
        assert!(validate_part_number(10_000).is_ok());
        assert!(validate_part_number(0).is_err());
        assert!(validate_part_number(-5).is_err());
        assert!(validate_part_number(10_001).is_err());
    }
}
