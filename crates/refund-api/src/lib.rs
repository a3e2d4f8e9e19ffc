//! 환급 요청 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 인증 및 역할 기반 접근 제어
//! - 영수증 업로드 (임시 → 영구 디렉토리)
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 관리
//! - [`storage`]: 업로드 파일 스테이징과 검증 정책
//! - [`repository`]: 사용자/환급 요청 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod app;
pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;
pub mod storage;

pub use app::create_router;
pub use auth::{hash_password, verify_password, Claims, Identity, JwtAuth, JwtAuthError};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;
