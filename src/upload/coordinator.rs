//! Upload session coordination
//!
//! Drives the object-store multipart lifecycle: initiate, complete,
//! abort. The coordinator itself is stateless; the `(uploadId, key)`
//! pair round-trips through the client on every call, which is an
//! explicit trust boundary rather than an oversight.

use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};
use crate::storage::{AbortOutcome, CompletedObject, S3Client, UploadedPart};

use super::chunk_plan::{self, MAX_PARTS};
use super::types::{InitiateUploadRequest, InitiateUploadResponse, PartDescriptor};

/// Coordinates multipart upload sessions against the object store
#[derive(Clone)]
pub struct UploadSessionCoordinator {
    s3: S3Client,
    config: UploadConfig,
}

impl UploadSessionCoordinator {
    pub fn new(s3: S3Client, config: UploadConfig) -> Self {
        Self { s3, config }
    }

    /// Open a multipart session: validate, build the storage key, size
    /// the chunks, then ask the store for an upload ID.
    pub async fn initiate(
        &self,
        request: InitiateUploadRequest,
    ) -> Result<InitiateUploadResponse> {
        let file_name = require_field(request.file_name.as_deref(), "fileName")?;
        let file_type = require_field(request.file_type.as_deref(), "fileType")?;
        let folder = require_field(request.folder.as_deref(), "folder")?;

        let key = build_storage_key(folder, file_name, request.week, request.day);
        let plan = chunk_plan::plan_upload(request.file_size);

        let upload = self.s3.create_multipart_upload(&key, file_type).await?;

        tracing::info!(
            key = %upload.key,
            upload_id = %upload.upload_id,
            file_size = ?request.file_size,
            chunk_size = plan.chunk_size,
            total_parts = ?plan.total_parts,
            "Initiated multipart upload"
        );

        Ok(InitiateUploadResponse {
            upload_id: upload.upload_id,
            key: upload.key,
            chunk_size: plan.chunk_size,
            total_parts: plan.total_parts,
            max_concurrent_uploads: self.config.max_concurrent_uploads,
        })
    }

    /// Finalize an upload from the client's part list.
    ///
    /// Malformed part lists are rejected before any remote call.
    pub async fn complete(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<PartDescriptor>,
    ) -> Result<CompletedObject> {
        let normalized = normalize_parts(parts)?;
        self.s3
            .complete_multipart_upload(key, upload_id, &normalized)
            .await
    }

    /// Release a session and any uploaded-but-uncommitted parts.
    /// Always safe to call, including redundantly.
    pub async fn abort(&self, key: &str, upload_id: &str) -> Result<AbortOutcome> {
        self.s3.abort_multipart_upload(key, upload_id).await
    }
}

fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{} is required", name))),
    }
}

/// Build the storage key for a new upload.
///
/// With week/day: `folder/week-N/day-M/<uuid>-<filename>`, otherwise
/// the flatter `folder/<uuid>-<filename>`.
pub(crate) fn build_storage_key(
    folder: &str,
    file_name: &str,
    week: Option<u32>,
    day: Option<u32>,
) -> String {
    let folder = folder.trim_matches('/');
    let name = sanitize_file_name(file_name);
    let unique = Uuid::new_v4();

    match (week, day) {
        (Some(week), Some(day)) => {
            format!("{}/week-{}/day-{}/{}-{}", folder, week, day, unique, name)
        }
        (Some(week), None) => format!("{}/week-{}/{}-{}", folder, week, unique, name),
        _ => format!("{}/{}-{}", folder, unique, name),
    }
}

/// Make a client-supplied file name safe to embed in a key
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Validate and normalize a client part list for submission.
///
/// Strips quoting/whitespace from integrity tags (object stores are
/// inconsistent about returning quoted ETags) and sorts ascending by
/// part number, which the store requires. Rejects empty lists, part
/// numbers outside `[1, MAX_PARTS]`, empty tags, and duplicates, naming
/// the offending entry.
pub(crate) fn normalize_parts(parts: Vec<PartDescriptor>) -> Result<Vec<UploadedPart>> {
    if parts.is_empty() {
        return Err(AppError::BadRequest(
            "parts must be a non-empty array".to_string(),
        ));
    }

    let mut normalized = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        let part_number = part
            .part_number
            .as_ref()
            .and_then(|value| value.as_i64())
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "parts[{}]: partNumber must be an integer",
                    index
                ))
            })?;

        if part_number < 1 || part_number > MAX_PARTS {
            return Err(AppError::BadRequest(format!(
                "parts[{}]: partNumber {} is outside [1, {}]",
                index, part_number, MAX_PARTS
            )));
        }

        let etag = part
            .etag
            .as_deref()
            .unwrap_or("")
            .trim()
            .trim_matches('"')
            .to_string();
        if etag.is_empty() {
            return Err(AppError::BadRequest(format!(
                "parts[{}]: eTag must be a non-empty string",
                index
            )));
        }

        normalized.push(UploadedPart {
            part_number: part_number as i32,
            etag,
        });
    }

    normalized.sort_by_key(|p| p.part_number);

    for window in normalized.windows(2) {
        if window[0].part_number == window[1].part_number {
            return Err(AppError::BadRequest(format!(
                "duplicate partNumber {}",
                window[0].part_number
            )));
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(number: i32, etag: &str) -> PartDescriptor {
        PartDescriptor {
            part_number: Some(serde_json::json!(number)),
            etag: Some(etag.to_string()),
        }
    }

    #[test]
    fn test_parts_are_sorted_ascending() {
        let normalized =
            normalize_parts(vec![part(3, "c"), part(1, "a"), part(2, "b")]).unwrap();
        let numbers: Vec<i32> = normalized.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let etags: Vec<&str> = normalized.iter().map(|p| p.etag.as_str()).collect();
        assert_eq!(etags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_parts_rejected() {
        let err = normalize_parts(vec![]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_etag_quoting_and_whitespace_stripped() {
        let normalized = normalize_parts(vec![part(1, "  \"abc123\" ")]).unwrap();
        assert_eq!(normalized[0].etag, "abc123");
    }

    #[test]
    fn test_malformed_entry_is_identified() {
        let err = normalize_parts(vec![part(1, "a"), part(2, "   ")]).unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("parts[1]")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_part_missing_etag_rejected_with_entry_index() {
        let request: crate::upload::CompleteUploadRequest = serde_json::from_str(
            r#"{"key": "k", "uploadId": "u", "parts": [{"PartNumber": 1}]}"#,
        )
        .unwrap();
        let err = normalize_parts(request.parts).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("parts[0]"));
                assert!(msg.contains("eTag"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_integer_part_number_rejected_with_entry_index() {
        let parts: Vec<PartDescriptor> = serde_json::from_str(
            r#"[{"partNumber": 1, "eTag": "a"}, {"partNumber": "two", "eTag": "b"}]"#,
        )
        .unwrap();
        let err = normalize_parts(parts).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("parts[1]"));
                assert!(msg.contains("integer"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_fractional_part_number_rejected() {
        let parts: Vec<PartDescriptor> =
            serde_json::from_str(r#"[{"partNumber": 1.5, "eTag": "a"}]"#).unwrap();
        assert!(normalize_parts(parts).is_err());
    }

    #[test]
    fn test_part_number_out_of_range_rejected() {
        assert!(normalize_parts(vec![part(0, "a")]).is_err());
        assert!(normalize_parts(vec![part(10_001, "a")]).is_err());
        assert!(normalize_parts(vec![part(10_000, "a")]).is_ok());
    }

    #[test]
    fn test_duplicate_part_numbers_rejected() {
        let err = normalize_parts(vec![part(1, "a"), part(1, "b")]).unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("duplicate")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_storage_key_with_week_and_day() {
        let key = build_storage_key("courses/rust-101", "intro video.mp4", Some(2), Some(3));
        assert!(key.starts_with("courses/rust-101/week-2/day-3/"));
        assert!(key.ends_with("-intro_video.mp4"));
    }

    #[test]
    fn test_storage_key_flat_when_no_week() {
        let key = build_storage_key("/thumbnails/", "cover.png", None, None);
        assert!(key.starts_with("thumbnails/"));
        assert!(!key.contains("week-"));
        assert!(key.ends_with("-cover.png"));
    }

    #[test]
    fn test_storage_keys_are_unique_per_call() {
        let a = build_storage_key("f", "x.mp4", None, None);
        let b = build_storage_key("f", "x.mp4", None, None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_file_name("a b\tc.mp4"), "a_b_c.mp4");
    }
}
