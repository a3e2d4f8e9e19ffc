//! 사용자 저장소 (PostgreSQL).

use async_trait::async_trait;
use chrono::Utc;
use refund_core::{NewUser, User};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, UserRepository};

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at, updated_at
            FROM users
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, input: NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, email, password, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password)
        .bind(input.role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::DuplicateEmail,
            _ => RepositoryError::Database(e),
        })
    }
}
