//! 로그인(세션 생성) endpoint.
//!
//! - `POST /sessions` - 이메일/비밀번호로 토큰 발급

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use refund_core::UserProfile;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{issue_token, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::{de, ValidatedJson};
use crate::metrics::record_login;
use crate::state::AppState;

/// 인증 실패 메시지. 이메일 미존재와 비밀번호 불일치를 구분하지 않습니다.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "E-mail ou senha inválida";

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[serde(deserialize_with = "de::trimmed_lowercase")]
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    /// 비밀번호가 제외된 사용자 정보
    pub user: UserProfile,
}

/// 세션 생성.
///
/// POST /sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let invalid = || {
        record_login("invalid_credentials");
        ApiError::with_status(INVALID_CREDENTIALS_MESSAGE, StatusCode::UNAUTHORIZED)
    };

    let Some(user) = state.users.find_by_email(&request.email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(invalid());
    };

    let password = request.password;
    let hash = user.password.clone();
    let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;

    if !matched {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(invalid());
    }

    let token = issue_token(
        user.id,
        user.role,
        state.config.auth.jwt_secret.expose_secret(),
        state.token_ttl,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::unclassified(e)
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "Session created");
    record_login("success");

    Ok(Json(SessionResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

/// 세션 라우터 생성.
pub fn sessions_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_session))
}
