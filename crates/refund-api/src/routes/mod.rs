//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크
//! - `/users` - 가입 (공개)
//! - `/sessions` - 로그인 (공개)
//! - `/refunds` - 환급 요청 생성/목록/조회 (인증 필요)
//! - `/uploads` - 영수증 업로드 (인증 필요)

pub mod health;
pub mod refunds;
pub mod sessions;
pub mod uploads;
pub mod users;

pub use health::{health_router, HealthResponse};
pub use refunds::{
    refunds_router, CreateRefundRequest, ListRefundsQuery, RefundListResponse,
};
pub use sessions::{sessions_router, CreateSessionRequest, SessionResponse};
pub use uploads::{uploads_router, UploadResponse};
pub use users::{users_router, CreateUserRequest};

use std::sync::Arc;

use axum::Router;
use refund_core::AppConfig;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
/// 인증은 라우터 단위가 아니라 각 핸들러의 [`JwtAuth`](crate::auth::JwtAuth) 추출기로 적용됩니다.
pub fn create_api_router(config: &AppConfig) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/users", users_router())
        .nest("/sessions", sessions_router())
        .nest("/refunds", refunds_router())
        .nest("/uploads", uploads_router(config.upload.max_request_size))
}
