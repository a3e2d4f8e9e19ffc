//! 환급 요청 endpoint.
//!
//! - `POST /refunds` - 환급 요청 생성 (employee)
//! - `GET /refunds` - 소유자 이름으로 필터링한 목록 (manager)
//! - `GET /refunds/{id}` - 단건 조회 (employee 본인 / manager)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use refund_core::{
    NewRefund, PageRequest, Pagination, Refund, RefundCategory, RefundWithOwner, Role,
    DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::{require_access, Access, JwtAuth, JwtAuthError};
use crate::error::{ApiError, ApiResult};
use crate::extract::{de, ValidatedJson, ValidatedQuery};
use crate::metrics::record_refund_created;
use crate::repository::RefundFilter;
use crate::state::AppState;
use crate::storage::Location;

/// 금액 저장 정밀도 (`NUMERIC(12,2)`).
const AMOUNT_SCALE: u32 = 2;

/// 저장 가능한 최대 금액 (9_999_999_999.99).
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, AMOUNT_SCALE)
}

/// 금액 검증.
///
/// 저장될 값(소수 둘째 자리 반올림)을 기준으로 검사합니다.
fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    let stored = value.round_dp(AMOUNT_SCALE);
    if stored <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive")
            .with_message("O valor precisa ser positivo".into()));
    }
    if stored > max_amount() {
        return Err(ValidationError::new("amount_too_large")
            .with_message("O valor excede o limite permitido".into()));
    }
    Ok(())
}

/// 환급 요청 생성 본문.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRefundRequest {
    #[serde(deserialize_with = "de::trimmed")]
    #[validate(length(min = 1, message = "Informe o nome da solicitação"))]
    pub name: String,

    pub category: RefundCategory,

    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,

    /// 업로드 응답의 파일 이름 (무작위 접두어 20자 이상)
    #[validate(length(min = 20, message = "Nome do arquivo inválido"))]
    pub filename: String,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// 목록 조회 쿼리.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListRefundsQuery {
    /// 소유자 이름 부분 일치
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "A página deve ser maior que zero"))]
    pub page: u32,

    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, message = "A quantidade por página deve ser maior que zero"))]
    pub per_page: u32,
}

/// 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefundListResponse {
    pub refunds: Vec<RefundWithOwner>,
    pub pagination: Pagination,
}

/// 환급 요청 생성.
///
/// POST /refunds
///
/// 참조하는 파일이 영구 디렉토리에 있어야 합니다.
pub async fn create_refund(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
    payload: Result<ValidatedJson<CreateRefundRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Refund>)> {
    require_access(&identity, Access::CreateRefund)?;
    let ValidatedJson(request) = payload?;

    if !state.stager.exists(&request.filename, Location::Upload).await? {
        return Err(ApiError::field("filename", "Arquivo não encontrado"));
    }

    let refund = state
        .refunds
        .create(NewRefund {
            name: request.name,
            category: request.category,
            amount: request.amount.round_dp(AMOUNT_SCALE),
            filename: request.filename,
            user_id: identity.subject,
        })
        .await?;

    tracing::info!(
        refund_id = %refund.id,
        user_id = %identity.subject,
        category = %refund.category,
        amount = %refund.amount,
        "Refund created"
    );
    record_refund_created(refund.category.as_str());

    Ok((StatusCode::CREATED, Json(refund)))
}

/// 환급 요청 목록.
///
/// GET /refunds?name=&page=1&perPage=10
pub async fn list_refunds(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
    query: Result<ValidatedQuery<ListRefundsQuery>, ApiError>,
) -> ApiResult<Json<RefundListResponse>> {
    require_access(&identity, Access::ListRefunds)?;
    let ValidatedQuery(query) = query?;

    let page = PageRequest::new(query.page, query.per_page);
    let result = state
        .refunds
        .list(&RefundFilter {
            owner_name: query.name,
            page,
        })
        .await?;

    Ok(Json(RefundListResponse {
        refunds: result.items,
        pagination: Pagination::new(page, result.total_records),
    }))
}

/// 환급 요청 단건 조회.
///
/// GET /refunds/{id}
///
/// 없으면 `null`. employee는 자신의 요청만 볼 수 있습니다.
pub async fn show_refund(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<RefundWithOwner>>> {
    require_access(&identity, Access::ShowRefund)?;

    let id = Uuid::parse_str(&id).map_err(|_| ApiError::field("id", "Id inválido"))?;
    let refund = state.refunds.find_by_id(id).await?;

    if let Some(found) = &refund {
        if identity.role == Role::Employee && found.refund.user_id != identity.subject {
            tracing::warn!(
                refund_id = %id,
                user_id = %identity.subject,
                "Employee tried to read another user's refund"
            );
            return Err(JwtAuthError::Forbidden.into());
        }
    }

    Ok(Json(refund))
}

/// 환급 요청 라우터 생성.
pub fn refunds_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_refunds).post(create_refund))
        .route("/{id}", get(show_refund))
}
