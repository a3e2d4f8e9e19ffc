//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 프로세스 시작 시 한 번 로드되며 이후 읽기 전용으로 공유됩니다.
//!
//! # 로드 순서 (뒤가 앞을 덮어씀)
//!
//! 1. 구조체 기본값
//! 2. `config/default.toml` (선택)
//! 3. `REFUND__<SECTION>__<KEY>` 환경 변수
//! 4. `JWT_SECRET`, `JWT_EXPIRES_IN`, `HOST`, `PORT`, `DATABASE_URL`,
//!    `TMP_FOLDER`, `UPLOADS_FOLDER` 환경 변수

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};

/// 기본 리스닝 포트.
pub const DEFAULT_PORT: u16 = 3333;

/// 업로드 허용 최대 파일 크기 (3 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 3 * 1024 * 1024;

/// 허용되는 이미지 MIME 타입.
pub const DEFAULT_ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 업로드 설정
    pub upload: UploadConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: 30,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT 서명 키. 비어 있으면 토큰 발급/검증이 모두 실패합니다.
    #[serde(deserialize_with = "deserialize_secret")]
    pub jwt_secret: SecretString,
    /// 토큰 수명 ("30", "45s", "15m", "12h", "1d", "1w")
    pub jwt_expires_in: String,
    /// 비밀번호 해시 비용 (Argon2 time cost)
    pub hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new().into()),
            jwt_expires_in: "1d".to_string(),
            hash_cost: 8,
        }
    }
}

impl AuthConfig {
    /// 서명 키가 설정되어 있는지 확인.
    pub fn has_secret(&self) -> bool {
        !self.jwt_secret.expose_secret().trim().is_empty()
    }

    /// 토큰 수명.
    pub fn token_ttl(&self) -> CoreResult<Duration> {
        parse_duration(&self.jwt_expires_in)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 메모리 저장소를 사용합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connect_timeout_secs: 10,
        }
    }
}

/// 업로드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 업로드 직후 파일이 놓이는 임시 디렉토리
    pub tmp_folder: PathBuf,
    /// 검증을 통과한 파일이 이동되는 영구 디렉토리
    pub uploads_folder: PathBuf,
    /// 최대 파일 크기 (바이트)
    pub max_file_size: u64,
    /// 업로드 요청 본문 최대 크기 (바이트)
    pub max_request_size: usize,
    /// 허용 MIME 타입
    pub accepted_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tmp_folder: PathBuf::from("tmp"),
            uploads_folder: PathBuf::from("tmp").join("uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_request_size: 16 * 1024 * 1024,
            accepted_types: DEFAULT_ACCEPTED_IMAGE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 평면 환경 변수 → 설정 키 매핑.
const FLAT_ENV_OVERRIDES: [(&str, &str); 7] = [
    ("JWT_SECRET", "auth.jwt_secret"),
    ("JWT_EXPIRES_IN", "auth.jwt_expires_in"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("TMP_FOLDER", "upload.tmp_folder"),
    ("UPLOADS_FOLDER", "upload.uploads_folder"),
];

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            // 파일에서 로드 (없어도 됨)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("REFUND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in FLAT_ENV_OVERRIDES {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다. 환경 변수는 읽지 않습니다.
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// 기간 문자열 파싱.
///
/// 숫자만 있으면 초 단위입니다. 접미사 `s`, `m`, `h`, `d`, `w`를 지원합니다.
pub fn parse_duration(input: &str) -> CoreResult<Duration> {
    let trimmed = input.trim();
    let invalid = || CoreError::InvalidDuration(input.to_string());

    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split_at);

    if digits.is_empty() {
        return Err(invalid());
    }

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let multiplier: u64 = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.port, 3333);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.jwt_expires_in, "1d");
        assert_eq!(config.auth.hash_cost, 8);
        assert!(!config.auth.has_secret());
        assert!(config.database.url.is_none());
        assert_eq!(config.upload.max_file_size, 3 * 1024 * 1024);
        assert_eq!(
            config.upload.accepted_types,
            vec!["image/jpeg", "image/jpg", "image/png"]
        );
    }

    #[test]
    fn test_toml_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "super-secret"
            jwt_expires_in = "12h"

            [upload]
            tmp_folder = "/var/tmp/refund"
            max_file_size = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.auth.has_secret());
        assert_eq!(config.auth.jwt_secret.expose_secret(), "super-secret");
        assert_eq!(config.auth.token_ttl().unwrap(), Duration::from_secs(12 * 3600));
        assert_eq!(config.upload.tmp_folder, PathBuf::from("/var/tmp/refund"));
        assert_eq!(config.upload.max_file_size, 1024);
        // 지정하지 않은 값은 기본값 유지
        assert_eq!(config.upload.uploads_folder, PathBuf::from("tmp/uploads"));
    }

    #[test]
    fn test_blank_secret_is_not_configured() {
        let config = AppConfig::from_toml_str("[auth]\njwt_secret = \"   \"\n").unwrap();
        assert!(!config.auth.has_secret());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert!(config.server.port > 0);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration(" 2w ").unwrap(), Duration::from_secs(1_209_600));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("1y").is_err());
        assert!(parse_duration("-5m").is_err());
        assert!(parse_duration("99999999999999999999d").is_err());
    }
}
