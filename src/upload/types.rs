//! Wire types for the multipart upload endpoints

use serde::{Deserialize, Serialize};

// ============================================================================
// Initiate
// ============================================================================

/// Request to open a multipart upload session.
///
/// Required fields are optional here so missing values produce a proper
/// validation error instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateUploadRequest {
    pub file_name: Option<String>,

    /// MIME type of the file
    pub file_type: Option<String>,

    /// Destination folder prefix inside the bucket
    pub folder: Option<String>,

    /// Total file size in bytes, when the client knows it
    #[serde(default)]
    pub file_size: Option<i64>,

    /// Optional week number for hierarchical placement
    #[serde(default)]
    pub week: Option<u32>,

    /// Optional day number within the week
    #[serde(default)]
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateUploadResponse {
    pub upload_id: String,

    /// Storage key the client must echo back on every subsequent call
    pub key: String,

    pub chunk_size: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_parts: Option<i64>,

    /// How many parts the client should upload in parallel
    pub max_concurrent_uploads: usize,
}

// ============================================================================
// Presign
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignPartRequest {
    pub key: String,
    pub upload_id: String,
    pub part_number: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignBatchRequest {
    pub key: String,
    pub upload_id: String,
    pub part_numbers: Vec<i32>,
}

/// A presigned upload URL for one part
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedPart {
    pub part_number: i32,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignBatchResponse {
    pub presigned_urls: Vec<PresignedPart>,
}

// ============================================================================
// Complete / Abort
// ============================================================================

/// One part as reported by the client after uploading it.
///
/// Accepts both camelCase and the PascalCase field names S3-style
/// clients produce (`PartNumber` / `ETag`). Fields are deliberately
/// lenient so a malformed entry reaches per-entry validation and gets
/// a 400 naming the offending index, instead of dying in the JSON
/// extractor as a whole-body rejection.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartDescriptor {
    #[serde(alias = "PartNumber", default)]
    pub part_number: Option<serde_json::Value>,

    #[serde(alias = "ETag", alias = "eTag", default)]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub key: String,
    pub upload_id: String,
    #[serde(default)]
    pub parts: Vec<PartDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortUploadRequest {
    pub key: String,
    pub upload_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortUploadResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_descriptor_accepts_pascal_case() {
        let part: PartDescriptor =
            serde_json::from_str(r#"{"PartNumber": 3, "ETag": "\"abc\""}"#).unwrap();
        assert_eq!(part.part_number, Some(serde_json::json!(3)));
        assert_eq!(part.etag.as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_part_descriptor_accepts_camel_case() {
        let part: PartDescriptor =
            serde_json::from_str(r#"{"partNumber": 1, "eTag": "abc"}"#).unwrap();
        assert_eq!(part.part_number, Some(serde_json::json!(1)));
        assert_eq!(part.etag.as_deref(), Some("abc"));
    }

    #[test]
    fn test_part_descriptor_tolerates_missing_and_mistyped_fields() {
        // Deserialization must not reject these; validation does, with
        // an error naming the entry.
        let part: PartDescriptor = serde_json::from_str(r#"{"PartNumber": 1}"#).unwrap();
        assert!(part.etag.is_none());

        let part: PartDescriptor =
            serde_json::from_str(r#"{"partNumber": "three", "eTag": "abc"}"#).unwrap();
        assert_eq!(part.part_number, Some(serde_json::json!("three")));
    }

    #[test]
    fn test_initiate_request_tolerates_missing_optionals() {
        let request: InitiateUploadRequest = serde_json::from_str(
            r#"{"fileName": "lecture.mp4", "fileType": "video/mp4", "folder": "courses/rust-101"}"#,
        )
        .unwrap();
        assert_eq!(request.file_name.as_deref(), Some("lecture.mp4"));
        assert_eq!(request.file_size, None);
        assert_eq!(request.week, None);
    }
}
