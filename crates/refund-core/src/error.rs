//! 핵심 도메인 에러 타입.
//!
//! 설정 로드와 기간 파싱에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 기간 표기 (예: "1d", "12h")
    #[error("잘못된 기간 형식: {0}")]
    InvalidDuration(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "설정 에러: missing field");

        let err = CoreError::InvalidDuration("1w".to_string());
        assert!(err.to_string().contains("1w"));
    }

    #[test]
    fn test_from_config_error() {
        let err: CoreError = config::ConfigError::Message("missing".to_string()).into();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
