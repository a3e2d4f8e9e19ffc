//! Axum용 JWT 인증 추출기.
//!
//! `Authorization: Bearer <token>` 헤더를 검증해 인증 주체를 꺼냅니다.
//! 역할 검사는 [`require_access`]로 핸들러 첫 줄에서 수행합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use super::{authorize, verify_token, Access, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// JWT 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(JwtAuth(identity): JwtAuth) -> impl IntoResponse {
///     format!("user {}", identity.subject)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JwtAuth(pub Identity);

/// JWT 인증 에러.
///
/// 모두 401로 응답합니다. 만료/서명 불일치/형식 오류는 구분하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("JWT token nao encontrado")]
    MissingToken,
    #[error("JWT token inválido")]
    InvalidToken,
    #[error("Não autorizado")]
    Forbidden,
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(JwtAuthError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(JwtAuthError::InvalidToken)?;

        let identity = verify_token(token, state.config.auth.jwt_secret.expose_secret())
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                JwtAuthError::InvalidToken
            })?;

        Ok(JwtAuth(identity))
    }
}

/// 인증 주체가 작업에 접근할 수 있는지 확인.
pub fn require_access(identity: &Identity, access: Access) -> Result<(), JwtAuthError> {
    authorize(Some(identity), access.allowed_roles()).map_err(|_| {
        tracing::warn!(
            user_id = %identity.subject,
            role = %identity.role,
            access = access.description(),
            "Access denied"
        );
        JwtAuthError::Forbidden
    })
}
