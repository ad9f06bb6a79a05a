//! Content streaming routes
//!
//! Serves resolved content out of object storage with HTTP range
//! support, so video players can seek and downloads can resume. Bytes
//! are piped from the store response straight into the client response;
//! a multi-gigabyte video must never be buffered whole in memory to
//! serve one range.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::catalog::ResolvedContent;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stream::{RangeError, StreamRange};

/// Create the streaming router. Identifiers are wildcards because
/// literal storage keys contain slashes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/info/*identifier", get(content_info))
        .route("/*identifier", get(stream_content))
}

/// GET /stream/{identifier}
///
/// Full content (200) without a Range header, partial content (206)
/// with one, 416 when the range cannot be satisfied.
async fn stream_content(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let resolved = state.locator().resolve(&identifier).await?;
    let s3 = state.s3_client();

    let metadata = s3.head_object(&resolved.storage_key).await?;
    let total_size = metadata.size.max(0) as u64;
    let content_type = metadata
        .content_type
        .clone()
        .unwrap_or_else(|| guess_content_type(&resolved.storage_key));

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let (status, range) = match range_header {
        None => (StatusCode::OK, None),
        Some(value) => match StreamRange::parse(value, total_size) {
            Ok(range) => (StatusCode::PARTIAL_CONTENT, Some(range)),
            // An unparseable Range header is ignored and the full
            // object served, per RFC 7233; only a parsed-but-violated
            // range earns a 416.
            Err(RangeError::Malformed { header, .. }) => {
                tracing::warn!(
                    key = %resolved.storage_key,
                    header = %header,
                    "Ignoring malformed Range header"
                );
                (StatusCode::OK, None)
            }
            Err(e @ RangeError::Unsatisfiable { .. }) => {
                return Err(AppError::RangeNotSatisfiable {
                    total_size: e.total_size(),
                });
            }
        },
    };

    let stream = match range {
        Some(range) => {
            s3.get_object_range(&resolved.storage_key, range.start, range.end)
                .await?
        }
        None => s3.get_object_stream(&resolved.storage_key).await?,
    };

    tracing::debug!(
        key = %resolved.storage_key,
        status = %status,
        range = ?range,
        "Streaming content"
    );

    let body = Body::from_stream(logged_stream(
        ReaderStream::new(stream.into_async_read()),
        resolved.storage_key.clone(),
    ));

    let content_length = range.map(|r| r.length()).unwrap_or(total_size);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, &content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::ACCEPT_RANGES, "bytes");

    if let Some(range) = range {
        builder = builder.header(header::CONTENT_RANGE, range.content_range());
    }

    builder = apply_disposition_headers(builder, &content_type, &resolved);

    builder
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Response metadata for GET /stream/info
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentInfoResponse {
    key: String,
    size: i64,
    content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

/// GET /stream/info/{identifier}
async fn content_info(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<ContentInfoResponse>> {
    let resolved = state.locator().resolve(&identifier).await?;
    let metadata = state.s3_client().head_object(&resolved.storage_key).await?;

    let content_type = metadata
        .content_type
        .unwrap_or_else(|| guess_content_type(&resolved.storage_key));

    Ok(Json(ContentInfoResponse {
        key: metadata.key,
        size: metadata.size,
        content_type,
        last_modified: metadata.last_modified,
        title: resolved.title,
    }))
}

/// Disposition and embedding headers.
///
/// PDFs get a forced inline disposition with a fixed filename (so
/// viewers preview instead of downloading), no cross-origin framing,
/// and no content-type sniffing.
fn apply_disposition_headers(
    builder: axum::http::response::Builder,
    content_type: &str,
    resolved: &ResolvedContent,
) -> axum::http::response::Builder {
    if content_type == "application/pdf" {
        return builder
            .header(header::CONTENT_DISPOSITION, "inline; filename=\"document.pdf\"")
            .header(header::X_FRAME_OPTIONS, "SAMEORIGIN")
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    }

    let filename = resolved
        .storage_key
        .rsplit('/')
        .next()
        .unwrap_or(&resolved.storage_key);
    builder.header(
        header::CONTENT_DISPOSITION,
        format!("inline; filename=\"{}\"", filename),
    )
}

/// Log body-stream failures without consuming them.
///
/// Errors after headers are sent cannot change the status; hyper drops
/// the connection and the client must treat the truncated body as a
/// failure. This leaves a server-side trace of which transfer broke.
fn logged_stream<S, O, E>(stream: S, key: String) -> impl Stream<Item = std::result::Result<O, E>>
where
    S: Stream<Item = std::result::Result<O, E>>,
    E: std::fmt::Display,
{
    stream.inspect_err(move |e| {
        tracing::error!(key = %key, error = %e, "Transfer aborted mid-stream");
    })
}

/// Guess content type from file extension (fallback for assets
/// addressed by literal key, which carry no recorded type)
fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}
