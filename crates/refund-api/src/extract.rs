//! 검증을 포함한 요청 추출기.
//!
//! [`ValidatedJson`] / [`ValidatedQuery`]는 역직렬화 후 `validator` 규칙을
//! 검사하고, 실패하면 [`ApiError::Validation`]으로 거부합니다.
//!
//! 역할 검사를 본문 검증보다 먼저 하려면 `Result<ValidatedJson<T>, ApiError>`로
//! 받아서 `require_access` 이후에 `?`로 꺼냅니다.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// 검증된 JSON 본문.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// 검증된 쿼리 문자열.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// 입력 정규화용 serde 헬퍼.
pub mod de {
    use serde::{Deserialize, Deserializer};

    /// 앞뒤 공백 제거.
    pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.trim().to_string())
    }

    /// 앞뒤 공백 제거 후 소문자 변환 (이메일).
    pub fn trimmed_lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.trim().to_lowercase())
    }
}
