//! 환급 요청.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 환급 카테고리.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "sqlx-support",
    derive(sqlx::Type),
    sqlx(type_name = "refund_category", rename_all = "lowercase")
)]
pub enum RefundCategory {
    /// 식비
    Food,
    /// 기타
    Others,
    /// 서비스
    Services,
    /// 교통
    Transport,
    /// 숙박
    Accommodation,
}

impl RefundCategory {
    /// 모든 카테고리.
    pub const ALL: [RefundCategory; 5] = [
        RefundCategory::Food,
        RefundCategory::Others,
        RefundCategory::Services,
        RefundCategory::Transport,
        RefundCategory::Accommodation,
    ];

    /// 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Others => "others",
            Self::Services => "services",
            Self::Transport => "transport",
            Self::Accommodation => "accommodation",
        }
    }
}

impl std::fmt::Display for RefundCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 환급 요청 레코드.
///
/// refunds 테이블의 표현입니다. 생성 후 수정/삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Refund {
    pub id: Uuid,
    pub name: String,
    pub category: RefundCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// 영구 저장소에 있는 영수증 파일명
    pub filename: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 새 환급 요청 입력.
#[derive(Debug, Clone)]
pub struct NewRefund {
    pub name: String,
    pub category: RefundCategory,
    pub amount: Decimal,
    pub filename: String,
    pub user_id: Uuid,
}

/// 환급 요청 소유자 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundOwner {
    pub name: String,
}

/// 소유자 정보가 포함된 환급 요청 (목록/상세 응답용).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundWithOwner {
    #[serde(flatten)]
    pub refund: Refund,
    pub user: RefundOwner,
}
