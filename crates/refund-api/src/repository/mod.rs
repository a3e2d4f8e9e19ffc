//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리합니다.
//! 핸들러는 trait 객체([`UserRepository`], [`RefundRepository`])만 알고,
//! 구현은 PostgreSQL([`PgUserRepository`], [`PgRefundRepository`]) 또는
//! 메모리([`MemoryStore`]) 중 하나가 시작 시 선택됩니다.

pub mod memory;
pub mod refunds;
pub mod users;

use async_trait::async_trait;
use refund_core::{NewRefund, NewUser, PageRequest, Refund, RefundWithOwner, User};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use refunds::PgRefundRepository;
pub use users::PgUserRepository;

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// 이미 같은 이메일의 사용자가 있음
    #[error("duplicate email")]
    DuplicateEmail,
    /// 데이터베이스 에러
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// 사용자 저장소.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 이메일로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// 사용자 생성. 이메일이 중복되면 [`RepositoryError::DuplicateEmail`].
    async fn create(&self, input: NewUser) -> Result<User, RepositoryError>;
}

/// 환급 요청 목록 필터.
#[derive(Debug, Clone, Default)]
pub struct RefundFilter {
    /// 소유자 이름 부분 일치 (대소문자 무시, 빈 문자열이면 전체)
    pub owner_name: String,
    pub page: PageRequest,
}

/// 환급 요청 한 페이지.
#[derive(Debug, Clone)]
pub struct RefundPage {
    pub items: Vec<RefundWithOwner>,
    /// 필터에 맞는 전체 레코드 수
    pub total_records: i64,
}

/// 환급 요청 저장소.
#[async_trait]
pub trait RefundRepository: Send + Sync {
    /// 환급 요청 생성.
    async fn create(&self, input: NewRefund) -> Result<Refund, RepositoryError>;

    /// 최신순 목록 조회.
    async fn list(&self, filter: &RefundFilter) -> Result<RefundPage, RepositoryError>;

    /// ID로 조회 (소유자 이름 포함).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefundWithOwner>, RepositoryError>;
}

/// LIKE 패턴의 특수문자 이스케이프.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
