//! 사용자 가입 endpoint.
//!
//! - `POST /users` - 새 사용자 생성 (인증 불필요)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Router};
use refund_core::{NewUser, Role};
use serde::Deserialize;
use validator::Validate;

use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult, DUPLICATE_EMAIL_MESSAGE};
use crate::extract::{de, ValidatedJson};
use crate::metrics::record_signup;
use crate::state::AppState;

/// 가입 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(deserialize_with = "de::trimmed")]
    #[validate(length(min = 2, message = "Nome é obrigatório!"))]
    pub name: String,

    #[serde(deserialize_with = "de::trimmed_lowercase")]
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 dígitos"))]
    pub password: String,

    /// 생략하면 employee
    #[serde(default)]
    pub role: Role,
}

/// 사용자 생성.
///
/// POST /users
///
/// 성공 시 본문 없이 201을 반환합니다.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<StatusCode> {
    if state.users.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::app(DUPLICATE_EMAIL_MESSAGE));
    }

    let password = request.password;
    let cost = state.config.auth.hash_cost;
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await?
        .map_err(ApiError::unclassified)?;

    // 동시 가입 경쟁은 저장소의 유일성 검사가 DuplicateEmail로 막음
    let user = state
        .users
        .create(NewUser {
            name: request.name,
            email: request.email,
            password: hashed,
            role: request.role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    record_signup(user.role.as_str());

    Ok(StatusCode::CREATED)
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_user))
}
