//! 도메인 모델.
//!
//! - [`user`]: 사용자와 역할
//! - [`refund`]: 환급 요청과 카테고리
//! - [`pagination`]: 목록 조회용 페이지 계산

pub mod pagination;
pub mod refund;
pub mod user;

pub use pagination::{PageRequest, Pagination, DEFAULT_PAGE, DEFAULT_PER_PAGE};
pub use refund::{NewRefund, Refund, RefundCategory, RefundOwner, RefundWithOwner};
pub use user::{NewUser, Role, User, UserProfile};
