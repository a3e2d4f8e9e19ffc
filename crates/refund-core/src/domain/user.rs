//! 사용자 및 역할.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
///
/// 라우트 접근을 제어하는 거친 단위의 권한 태그입니다.
/// 가입 시 결정되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "sqlx-support",
    derive(sqlx::Type),
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
pub enum Role {
    /// 직원 - 환급 요청 생성 및 영수증 업로드
    #[default]
    Employee,
    /// 관리자 - 전체 환급 요청 조회
    Manager,
}

impl Role {
    /// 모든 역할.
    pub const ALL: [Role; 2] = [Role::Employee, Role::Manager];

    /// 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 사용자 레코드.
///
/// `password`는 해시된 값입니다. 클라이언트 응답에는 [`UserProfile`]을 사용합니다.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 새 사용자 삽입용.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// 해시된 비밀번호
    pub password: String,
    pub role: Role,
}

/// 비밀번호를 제외한 사용자 정보 (응답용).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"manager\"");

        let parsed: Role = serde_json::from_str("\"employee\"").unwrap();
        assert_eq!(parsed, Role::Employee);
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert_eq!(Role::default(), Role::Employee);
    }

    #[test]
    fn test_profile_has_no_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "$argon2id$hash".to_string(),
            role: Role::Employee,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["role"], "employee");
        assert!(json.get("createdAt").is_some());
    }
}
