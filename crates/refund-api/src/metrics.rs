//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 가입/로그인/환급/업로드 메트릭을 수집하고
//! `/metrics` 엔드포인트로 노출합니다.

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더는 프로세스당 하나만 설치할 수 있으며, 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 비즈니스 메트릭 헬퍼 함수
// ============================================================================

/// 가입 카운터 증가.
pub fn record_signup(role: &str) {
    counter!("refund_signups_total", "role" => role.to_string()).increment(1);
}

/// 로그인 시도 결과 기록 ("success" | "invalid_credentials").
pub fn record_login(outcome: &'static str) {
    counter!("refund_logins_total", "outcome" => outcome).increment(1);
}

/// 환급 요청 생성 카운터 증가.
pub fn record_refund_created(category: &str) {
    counter!("refund_requests_created_total", "category" => category.to_string()).increment(1);
}

/// 업로드 결과 기록 ("accepted" | "rejected").
pub fn record_upload(outcome: &'static str) {
    counter!("refund_uploads_total", "outcome" => outcome).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 라우터가 매칭한 경로 템플릿이 없을 때(404 등) 라벨 폭증을 막기 위해 사용합니다.
///
/// 예: `/refunds/123e4567-e89b-12d3-a456-426614174000` → `/refunds/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid =
                segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/refunds/123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(normalize_path(path), "/refunds/:id");
    }

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/refunds/12345"), "/refunds/:id");
    }

    #[test]
    fn test_normalize_path_no_params() {
        assert_eq!(normalize_path("/sessions"), "/sessions");
        assert_eq!(normalize_path("/"), "/");
    }
}
