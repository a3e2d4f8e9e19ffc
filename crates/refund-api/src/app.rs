//! 전체 HTTP 애플리케이션 조립.
//!
//! API 라우터에 메트릭, 추적, 타임아웃, CORS 레이어를 붙입니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::metrics_layer;
use crate::routes::create_api_router;
use crate::state::AppState;

/// CORS 레이어 생성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://app.example.com,https://admin.example.com`
pub fn cors_layer() -> CorsLayer {
    let configured = std::env::var("CORS_ORIGINS")
        .ok()
        .filter(|origins| !origins.is_empty());

    let allow_origin = match &configured {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// 전체 라우터 생성.
///
/// `metrics_handle`이 있으면 `/metrics`를 노출합니다.
pub fn create_router(state: Arc<AppState>, metrics_handle: Option<PrometheusHandle>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let api_router = create_api_router(&state.config).with_state(state);

    let router = match metrics_handle {
        Some(handle) => {
            let metrics_router = Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle);
            Router::new().merge(metrics_router).merge(api_router)
        }
        None => api_router,
    };

    router
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(cors_layer())
}
