//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 프로세스 시작 시 한 번 만들어지고
//! `Arc`로 래핑되어 모든 요청에서 읽기 전용으로 공유됩니다.

use std::sync::Arc;
use std::time::Duration;

use refund_core::{AppConfig, CoreResult};
use sqlx::PgPool;

use crate::repository::{
    MemoryStore, PgRefundRepository, PgUserRepository, RefundRepository, UserRepository,
};
use crate::storage::{FileStager, UploadPolicy};

/// 저장소 백엔드 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
pub struct AppState {
    /// 로드된 설정 (서명 키 포함)
    pub config: Arc<AppConfig>,

    /// 사용자 저장소
    pub users: Arc<dyn UserRepository>,

    /// 환급 요청 저장소
    pub refunds: Arc<dyn RefundRepository>,

    /// 업로드 파일 스테이저 (tmp → uploads)
    pub stager: FileStager,

    /// 업로드 검증 정책
    pub upload_policy: UploadPolicy,

    /// 세션 토큰 수명
    pub token_ttl: Duration,

    /// 데이터베이스 연결 풀 (PostgreSQL 사용 시)
    pub db_pool: Option<PgPool>,

    /// 저장소 백엔드
    pub backend: StoreBackend,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 메모리 저장소를 사용하는 상태 생성.
    ///
    /// 토큰 수명 문자열이 잘못되면 에러를 반환합니다.
    pub fn in_memory(config: AppConfig) -> CoreResult<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::build(config, store.clone(), store, None, StoreBackend::Memory)
    }

    /// PostgreSQL 저장소를 사용하는 상태 생성.
    pub fn with_postgres(config: AppConfig, pool: PgPool) -> CoreResult<Self> {
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let refunds = Arc::new(PgRefundRepository::new(pool.clone()));
        Self::build(config, users, refunds, Some(pool), StoreBackend::Postgres)
    }

    fn build(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        refunds: Arc<dyn RefundRepository>,
        db_pool: Option<PgPool>,
        backend: StoreBackend,
    ) -> CoreResult<Self> {
        let token_ttl = config.auth.token_ttl()?;

        if !config.auth.has_secret() {
            tracing::warn!("JWT secret is not configured; sessions and protected routes will fail");
        }

        Ok(Self {
            stager: FileStager::from_config(&config.upload),
            upload_policy: UploadPolicy::from_config(&config.upload),
            config: Arc::new(config),
            users,
            refunds,
            token_ttl,
            db_pool,
            backend,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인. 메모리 저장소는 항상 정상입니다.
    pub async fn is_store_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => true,
        }
    }
}
