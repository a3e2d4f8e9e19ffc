//! 통합 API 에러 타입.
//!
//! 모든 핸들러 실패는 [`ApiError`]로 전파되어 한 곳([`IntoResponse`] 구현)에서
//! 상태 코드와 본문으로 변환됩니다.
//!
//! # 응답 형식
//!
//! ```json
//! { "message": "Já existe um usuário cadastrado com esse e-mail" }
//! ```
//!
//! 입력 검증 실패는 필드별 트리를 함께 보냅니다:
//!
//! ```json
//! {
//!   "message": "erro de validação",
//!   "issues": { "errors": [], "properties": { "email": { "errors": ["E-mail inválido"] } } }
//! }
//! ```

use std::collections::BTreeMap;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::JwtAuthError;
use crate::repository::RepositoryError;
use crate::storage::StorageError;

/// 입력 검증 실패 응답 메시지.
pub const VALIDATION_MESSAGE: &str = "erro de validação";

/// 이메일 중복 메시지.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Já existe um usuário cadastrado com esse e-mail";

/// 필드별 메시지가 없을 때 사용하는 기본 메시지.
const DEFAULT_FIELD_MESSAGE: &str = "Valor inválido";

/// 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 입력 검증 실패 상세 (검증 에러일 때만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<ValidationIssues>,
}

/// 필드 단위 검증 에러 트리.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssues {
    /// 특정 필드에 속하지 않는 에러
    pub errors: Vec<String>,
    /// 필드별 에러
    pub properties: BTreeMap<String, FieldIssues>,
}

/// 단일 필드의 에러 목록.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldIssues {
    pub errors: Vec<String>,
}

impl ValidationIssues {
    /// 필드 하나에 대한 에러.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut issues = Self::default();
        issues.push_field(field, message);
        issues
    }

    /// 필드에 속하지 않는 에러.
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            properties: BTreeMap::new(),
        }
    }

    /// 필드 에러 추가.
    pub fn push_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.properties
            .entry(field.into())
            .or_default()
            .errors
            .push(message.into());
    }

    /// 첫 번째 에러 메시지 (루트 우선, 이후 필드 이름 순).
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .first()
            .or_else(|| {
                self.properties
                    .values()
                    .find_map(|field| field.errors.first())
            })
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.properties.values().all(|f| f.errors.is_empty())
    }
}

impl From<validator::ValidationErrors> for ValidationIssues {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues = ValidationIssues::default();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| DEFAULT_FIELD_MESSAGE.to_string());

                // 스키마 단위 에러는 루트로
                if field == "__all__" {
                    issues.errors.push(message);
                } else {
                    issues.push_field(field.to_string(), message);
                }
            }
        }

        issues
    }
}

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 요청 본문/쿼리/경로 형식 오류 (400)
    #[error("erro de validação")]
    Validation(ValidationIssues),

    /// 도메인 에러 (명시된 상태 코드, 기본 400)
    #[error("{message}")]
    App { message: String, status: StatusCode },

    /// 분류되지 않은 에러 (500, 원본 메시지만 전달)
    #[error("{0}")]
    Unclassified(String),
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 400 도메인 에러.
    pub fn app(message: impl Into<String>) -> Self {
        Self::App {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// 상태 코드를 지정한 도메인 에러.
    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self::App {
            message: message.into(),
            status,
        }
    }

    /// 단일 필드 검증 에러.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationIssues::field(field, message))
    }

    /// 분류되지 않은 에러.
    pub fn unclassified(err: impl std::fmt::Display) -> Self {
        Self::Unclassified(err.to_string())
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::App { status, .. } => *status,
            ApiError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 응답 본문.
    pub fn body(&self) -> ApiErrorResponse {
        match self {
            ApiError::Validation(issues) => ApiErrorResponse {
                message: VALIDATION_MESSAGE.to_string(),
                issues: Some(issues.clone()),
            },
            ApiError::App { message, .. } | ApiError::Unclassified(message) => ApiErrorResponse {
                message: message.clone(),
                issues: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Unclassified(message) => {
                tracing::error!(error = %message, "Unhandled error");
            }
            ApiError::App { message, status } => {
                tracing::debug!(status = status.as_u16(), message = %message, "Request failed");
            }
            ApiError::Validation(issues) => {
                tracing::debug!(issues = ?issues, "Request validation failed");
            }
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.into())
    }
}

impl From<JwtAuthError> for ApiError {
    fn from(err: JwtAuthError) -> Self {
        ApiError::with_status(err.to_string(), StatusCode::UNAUTHORIZED)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationIssues::root(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(ValidationIssues::root(rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(ValidationIssues::root(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // 본문 크기 초과(413) 등은 원래 상태 코드를 유지
        ApiError::with_status(err.body_text(), err.status())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => ApiError::app(DUPLICATE_EMAIL_MESSAGE),
            RepositoryError::Database(e) => ApiError::unclassified(e),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(_) => ApiError::field("filename", err.to_string()),
            StorageError::NotFound(_) | StorageError::Io(_) => ApiError::unclassified(err),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::unclassified(err)
    }
}
