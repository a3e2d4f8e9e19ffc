//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: 비밀번호 해싱 및 비교
//! - [`issue_token`] / [`verify_token`]: 세션 토큰 발급/검증
//! - [`authorize`]: 역할 허용 목록 검사
//! - [`JwtAuth`]: Axum 핸들러용 인증 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn list_refunds(JwtAuth(identity): JwtAuth) -> ApiResult<Json<Value>> {
//!     require_access(&identity, Access::ListRefunds)?;
//!     // ...
//! }
//! ```

mod jwt;
mod middleware;
mod password;
mod roles;

pub use jwt::{create_token, issue_token, verify_token, Claims, Identity, JwtError};
pub use middleware::{require_access, JwtAuth, JwtAuthError};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::{authorize, Access, Denied};
