//! JWT 토큰 처리.
//!
//! 세션 토큰 발급/검증 로직. 토큰에는 사용자 ID(`sub`)와 역할만 담깁니다.
//! 역할은 발급 시점에 고정되며 이후 저장소와 다시 대조하지 않습니다.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use refund_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 현재 시각 기준으로 `ttl` 후 만료되는 Claims 생성.
    pub fn new(subject: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }
}

/// 검증된 토큰에서 얻은 인증 주체.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// 사용자 ID
    pub subject: Uuid,
    /// 사용자 역할
    pub role: Role,
}

/// JWT 처리 에러.
///
/// 검증 실패는 원인(서명 불일치, 형식 오류, 만료)과 관계없이
/// 모두 [`JwtError::InvalidToken`]으로 합쳐집니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT 서명 키가 설정되지 않았습니다")]
    MissingSecret,
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

/// Claims를 서명된 토큰으로 인코딩.
///
/// 서명 키가 비어 있으면 발급하지 않습니다.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.trim().is_empty() {
        return Err(JwtError::MissingSecret);
    }

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// 세션 토큰 발급.
///
/// # Arguments
///
/// * `subject` - 사용자 ID
/// * `role` - 사용자 역할
/// * `secret` - 서명 키
/// * `ttl` - 토큰 수명
pub fn issue_token(
    subject: Uuid,
    role: Role,
    secret: &str,
    ttl: Duration,
) -> Result<String, JwtError> {
    create_token(&Claims::new(subject, role, ttl), secret)
}

/// 세션 토큰 검증.
///
/// 서명, 만료(여유 시간 없음), 형식을 검사하고 인증 주체를 반환합니다.
/// 서명 키가 비어 있으면 항상 실패합니다.
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, JwtError> {
    if secret.trim().is_empty() {
        return Err(JwtError::InvalidToken);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| JwtError::InvalidToken)?;

    let subject = Uuid::parse_str(&data.claims.sub).map_err(|_| JwtError::InvalidToken)?;

    Ok(Identity {
        subject,
        role: data.claims.role,
    })
}
