//! 영수증 업로드 endpoint.
//!
//! - `POST /uploads` - multipart `file` 필드를 받아 영구 디렉토리에 저장 (employee)
//!
//! 파일은 먼저 임시 디렉토리에 스트리밍으로 기록되고, 검증을 통과하면
//! 영구 디렉토리로 이동합니다. 검증에 실패하거나 요청이 도중에 취소되면
//! 스테이징 가드가 임시 파일을 지웁니다.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{require_access, Access, JwtAuth};
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_upload;
use crate::state::AppState;
use crate::storage::{FileStager, StagedUpload, UploadedFile};

/// 파일을 담는 multipart 필드 이름.
pub const FILE_FIELD: &str = "file";

/// 파일 누락 메시지.
pub const FILE_REQUIRED_MESSAGE: &str = "Arquivo é obrigatório";

/// 업로드 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 영구 디렉토리에 저장된 파일 이름
    pub filename: String,
}

/// 파일 업로드.
///
/// POST /uploads
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    require_access(&identity, Access::CreateUpload)?;
    let mut multipart = multipart?;

    let Some((upload, staged)) = receive_file(&state.stager, &mut multipart).await? else {
        return Err(ApiError::app(FILE_REQUIRED_MESSAGE));
    };

    if let Err(issues) = state.upload_policy.validate(&upload) {
        // 응답 전에 임시 파일 삭제
        drop(staged);

        tracing::debug!(
            filename = %upload.filename,
            mimetype = %upload.mimetype,
            size = upload.size,
            "Upload rejected"
        );

        record_upload("rejected");
        let message = issues.first_message().unwrap_or(FILE_REQUIRED_MESSAGE);
        return Err(ApiError::app(message));
    }

    let filename = state.stager.persist_staged(staged).await?;

    tracing::info!(
        user_id = %identity.subject,
        filename = %filename,
        size = upload.size,
        "Receipt uploaded"
    );
    record_upload("accepted");

    Ok(Json(UploadResponse { filename }))
}

/// 첫 번째 `file` 필드를 임시 디렉토리에 기록.
///
/// 파일 필드가 없으면 `None`.
async fn receive_file(
    stager: &FileStager,
    multipart: &mut Multipart,
) -> ApiResult<Option<(UploadedFile, StagedUpload)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // 파일 이름이 없으면 일반 텍스트 필드
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mimetype = field.content_type().unwrap_or_default().to_string();

        let staged = stream_to_tmp(stager, &original_name, field).await?;
        let upload = UploadedFile {
            filename: staged.filename().to_string(),
            mimetype,
            size: staged.size(),
        };

        return Ok(Some((upload, staged)));
    }

    Ok(None)
}

/// 필드를 임시 디렉토리로 스트리밍.
///
/// 어느 단계에서든 빠져나가면 `staged`가 drop되며 부분 파일이 삭제됩니다.
async fn stream_to_tmp(
    stager: &FileStager,
    original_name: &str,
    mut field: Field<'_>,
) -> ApiResult<StagedUpload> {
    let mut staged = stager.stage(original_name).await?;

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => staged.write_chunk(&chunk).await?,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(filename = %staged.filename(), error = %e, "Upload stream aborted");
                return Err(e.into());
            }
        }
    }

    Ok(staged.finish().await?)
}

/// 업로드 라우터 생성.
///
/// `body_limit`은 multipart 요청 전체 크기 상한입니다. 파일 크기 제한보다 커야
/// 초과 파일이 검증 단계까지 도달해 정리됩니다.
pub fn uploads_router(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_upload))
        .layer(DefaultBodyLimit::max(body_limit))
}
