//! 환급 요청 저장소 (PostgreSQL).

use async_trait::async_trait;
use chrono::Utc;
use refund_core::{NewRefund, Refund, RefundOwner, RefundWithOwner};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{escape_like, RefundFilter, RefundPage, RefundRepository, RepositoryError};

/// 소유자 이름이 붙은 조회 행.
#[derive(Debug, FromRow)]
struct RefundRow {
    #[sqlx(flatten)]
    refund: Refund,
    user_name: String,
}

impl From<RefundRow> for RefundWithOwner {
    fn from(row: RefundRow) -> Self {
        RefundWithOwner {
            refund: row.refund,
            user: RefundOwner {
                name: row.user_name,
            },
        }
    }
}

/// PostgreSQL 환급 요청 저장소.
#[derive(Debug, Clone)]
pub struct PgRefundRepository {
    pool: PgPool,
}

impl PgRefundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefundRepository for PgRefundRepository {
    async fn create(&self, input: NewRefund) -> Result<Refund, RepositoryError> {
        let now = Utc::now();

        let refund = sqlx::query_as::<_, Refund>(
            r#"
            INSERT INTO refunds (id, name, category, amount, filename, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, name, category, amount, filename, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.category)
        .bind(input.amount)
        .bind(&input.filename)
        .bind(input.user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(refund)
    }

    async fn list(&self, filter: &RefundFilter) -> Result<RefundPage, RepositoryError> {
        let pattern = format!("%{}%", escape_like(filter.owner_name.trim()));

        let total_records: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM refunds r
            JOIN users u ON u.id = r.user_id
            WHERE u.name ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, RefundRow>(
            r#"
            SELECT r.id, r.name, r.category, r.amount, r.filename, r.user_id,
                   r.created_at, r.updated_at, u.name AS user_name
            FROM refunds r
            JOIN users u ON u.id = r.user_id
            WHERE u.name ILIKE $1
            ORDER BY r.created_at DESC, r.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(filter.page.limit())
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(RefundPage {
            items: rows.into_iter().map(Into::into).collect(),
            total_records,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefundWithOwner>, RepositoryError> {
        let row = sqlx::query_as::<_, RefundRow>(
            r#"
            SELECT r.id, r.name, r.category, r.amount, r.filename, r.user_id,
                   r.created_at, r.updated_at, u.name AS user_name
            FROM refunds r
            JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
