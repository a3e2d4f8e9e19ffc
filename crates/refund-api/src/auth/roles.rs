//! 역할 기반 접근 제어.
//!
//! 라우트별 허용 역할 목록과 권한 게이트.

use refund_core::Role;

use super::Identity;

/// 보호된 작업.
///
/// 각 작업은 허용 역할 목록을 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// 환급 요청 생성 (`POST /refunds`)
    CreateRefund,
    /// 환급 요청 목록 조회 (`GET /refunds`)
    ListRefunds,
    /// 환급 요청 상세 조회 (`GET /refunds/{id}`)
    ShowRefund,
    /// 영수증 업로드 (`POST /uploads`)
    CreateUpload,
}

impl Access {
    /// 모든 보호된 작업.
    pub const ALL: [Access; 4] = [
        Access::CreateRefund,
        Access::ListRefunds,
        Access::ShowRefund,
        Access::CreateUpload,
    ];

    /// 작업의 허용 역할 목록.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Access::CreateRefund => &[Role::Employee],
            Access::ListRefunds => &[Role::Manager],
            Access::ShowRefund => &[Role::Employee, Role::Manager],
            Access::CreateUpload => &[Role::Employee],
        }
    }

    /// 작업에 대한 설명 반환.
    pub fn description(&self) -> &'static str {
        match self {
            Access::CreateRefund => "환급 요청 생성",
            Access::ListRefunds => "환급 요청 목록 조회",
            Access::ShowRefund => "환급 요청 상세 조회",
            Access::CreateUpload => "영수증 업로드",
        }
    }
}

/// 권한 게이트 거부.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Não autorizado")]
pub struct Denied;

/// 권한 게이트.
///
/// 인증 주체가 있고 그 역할이 허용 목록에 포함될 때만 통과합니다.
/// 토큰 검증이 끝난 뒤에만 호출해야 합니다.
pub fn authorize(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), Denied> {
    match identity {
        Some(identity) if allowed.contains(&identity.role) => Ok(()),
        _ => Err(Denied),
    }
}
