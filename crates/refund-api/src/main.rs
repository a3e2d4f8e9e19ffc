//! 환급 요청 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 가입, 로그인, 환급 요청, 영수증 업로드 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info, warn};

use refund_api::create_router;
use refund_api::metrics::setup_metrics_recorder;
use refund_api::state::AppState;
use refund_core::{init_logging, AppConfig, DatabaseConfig, LogConfig};

/// PostgreSQL 연결 및 마이그레이션.
///
/// 연결이나 마이그레이션에 실패하면 `None`을 반환하고 메모리 저장소로 전환됩니다.
async fn connect_database(config: &DatabaseConfig) -> Option<PgPool> {
    let Some(url) = config.url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database, using in-memory store");
            return None;
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        error!(error = %e, "Failed to run database migrations, using in-memory store");
        return None;
    }

    info!("Connected to PostgreSQL and applied migrations");
    Some(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    info!("Starting Refund API server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = match setup_metrics_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            Some(handle)
        }
        Err(e) => {
            warn!(error = %e, "Failed to install metrics recorder, /metrics disabled");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{} (check HOST and PORT)",
                config.server.host, config.server.port
            )
        })?;

    let state = match connect_database(&config.database).await {
        Some(pool) => AppState::with_postgres(config, pool),
        None => AppState::in_memory(config),
    }
    .context("failed to build application state")?;
    let state = Arc::new(state);

    info!(
        version = %state.version,
        backend = state.backend.as_str(),
        tmp_folder = %state.config.upload.tmp_folder.display(),
        uploads_folder = %state.config.upload.uploads_folder.display(),
        token_ttl_secs = state.token_ttl.as_secs(),
        "Application state initialized"
    );

    let has_metrics = metrics_handle.is_some();
    let app = create_router(state, metrics_handle);

    info!(%addr, "API server listening");
    if has_metrics {
        info!("Metrics available at http://{}/metrics", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
