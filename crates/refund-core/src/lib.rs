//! # Refund Core
//!
//! 환급(경비 정산) 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 및 역할
//! - 환급 요청 및 카테고리
//! - 페이지네이션
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
