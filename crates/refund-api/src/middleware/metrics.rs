//! HTTP 요청 metrics middleware.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 메트릭 `path` 라벨.
///
/// 라우터가 매칭한 템플릿(`/refunds/{id}`)이 있으면 그대로 쓰고,
/// 매칭되지 않은 요청(404)은 동적 세그먼트를 `:id`로 접습니다.
fn path_label(request: &Request) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    }
}

/// 요청 수, 상태별 응답 수, 처리 시간을 기록하는 미들웨어.
///
/// `Router::layer`로 붙여야 라우트별로 감싸져 [`MatchedPath`]를 볼 수 있습니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = path_label(&request);

    record_http_request(&method, &path);
    let response = next.run(request).await;

    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, started.elapsed().as_secs_f64());

    response
}
