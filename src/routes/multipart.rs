//! Multipart upload routes
//!
//! Endpoints:
//! - POST /multipart/initiate - open a session, return the chunk plan
//! - POST /multipart/presign-part - one part upload URL
//! - POST /multipart/presign-parts-batch - bounded batch of part URLs
//! - POST /multipart/complete - finalize from the client's part list
//! - POST /multipart/abort - release the session (idempotent)
//!
//! The server holds no session state between these calls; the client
//! carries `(uploadId, key)` from initiate through completion.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::state::AppState;
use crate::storage::AbortOutcome;
use crate::upload::{
    AbortUploadRequest, AbortUploadResponse, CompleteUploadRequest, CompleteUploadResponse,
    InitiateUploadRequest, InitiateUploadResponse, PresignBatchRequest, PresignBatchResponse,
    PresignPartRequest, PresignedPart,
};

/// Create the multipart router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate))
        .route("/presign-part", post(presign_part))
        .route("/presign-parts-batch", post(presign_parts_batch))
        .route("/complete", post(complete))
        .route("/abort", post(abort))
}

/// POST /multipart/initiate
async fn initiate(
    State(state): State<AppState>,
    Json(request): Json<InitiateUploadRequest>,
) -> Result<Json<InitiateUploadResponse>> {
    let response = state.coordinator().initiate(request).await?;
    Ok(Json(response))
}

/// POST /multipart/presign-part
async fn presign_part(
    State(state): State<AppState>,
    Json(request): Json<PresignPartRequest>,
) -> Result<Json<PresignedPart>> {
    let presigned = state
        .presign_batcher()
        .presign_one(&request.key, &request.upload_id, request.part_number)
        .await?;
    Ok(Json(presigned))
}

/// POST /multipart/presign-parts-batch
async fn presign_parts_batch(
    State(state): State<AppState>,
    Json(request): Json<PresignBatchRequest>,
) -> Result<Json<PresignBatchResponse>> {
    let presigned_urls = state
        .presign_batcher()
        .presign_batch(&request.key, &request.upload_id, &request.part_numbers)
        .await?;
    Ok(Json(PresignBatchResponse { presigned_urls }))
}

/// POST /multipart/complete
async fn complete(
    State(state): State<AppState>,
    Json(request): Json<CompleteUploadRequest>,
) -> Result<Json<CompleteUploadResponse>> {
    let completed = state
        .coordinator()
        .complete(&request.key, &request.upload_id, request.parts)
        .await?;

    Ok(Json(CompleteUploadResponse {
        success: true,
        location: completed.location,
        key: completed.key,
    }))
}

/// POST /multipart/abort
async fn abort(
    State(state): State<AppState>,
    Json(request): Json<AbortUploadRequest>,
) -> Result<Json<AbortUploadResponse>> {
    let outcome = state
        .coordinator()
        .abort(&request.key, &request.upload_id)
        .await?;

    let message = match outcome {
        AbortOutcome::Aborted => "Upload aborted".to_string(),
        AbortOutcome::AlreadyGone => {
            "Upload already completed or aborted".to_string()
        }
    };

    Ok(Json(AbortUploadResponse {
        success: true,
        message,
    }))
}
