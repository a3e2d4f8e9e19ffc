//! 업로드 파일 저장소.
//!
//! 업로드된 파일은 먼저 임시 디렉토리에 기록되고, 검증을 통과하면
//! 영구 디렉토리로 이동하며, 실패하면 삭제됩니다.
//!
//! ```text
//! Uploaded(tmp) ── validate ok ──▶ Persisted(uploads)
//!       │
//!       └──── validate fail ──▶ Deleted
//! ```

mod policy;
mod stager;

pub use policy::{UploadPolicy, UploadedFile};
pub use stager::{FileStager, Location, StagedFile, StagedUpload, StorageError};
