//! Storage types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a storage object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// A freshly created multipart upload session.
///
/// The server keeps no record of this: the pair round-trips through the
/// client on every subsequent presign/complete/abort call.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub upload_id: String,
    pub key: String,
}

/// One uploaded part, as reported back by the client after it PUT the
/// bytes against a presigned URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    pub part_number: i32,
    pub etag: String,
}

/// Result of completing a multipart upload
#[derive(Debug, Clone)]
pub struct CompletedObject {
    pub key: String,
    pub location: Option<String>,
    pub etag: Option<String>,
}

/// Outcome of an abort call. `AlreadyGone` is success: the session the
/// caller wanted removed no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    Aborted,
    AlreadyGone,
}
