//! Multipart upload orchestration
//!
//! The client pushes bytes straight to the object store over presigned
//! part URLs; the server only plans chunk sizes and drives the
//! initiate/presign/complete/abort lifecycle. No upload state is held
//! between requests.

pub mod chunk_plan;
mod coordinator;
mod presign;
mod types;

pub use coordinator::UploadSessionCoordinator;
pub use presign::PartPresignBatcher;
pub use types::*;
