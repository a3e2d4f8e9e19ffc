//! 메모리 저장소.
//!
//! `DATABASE_URL`이 없을 때 사용하는 프로세스 내 저장소입니다.
//! 재시작하면 데이터가 사라집니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use refund_core::{NewRefund, NewUser, Refund, RefundOwner, RefundWithOwner, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RefundFilter, RefundPage, RefundRepository, RepositoryError, UserRepository};

/// 사용자와 환급 요청을 함께 보관하는 메모리 저장소.
///
/// 두 trait을 모두 구현하므로 하나의 `Arc<MemoryStore>`를
/// 양쪽 저장소로 공유할 수 있습니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    refunds: RwLock<Vec<Refund>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_owner(refund: &Refund, users: &HashMap<Uuid, User>) -> RefundWithOwner {
        let name = users
            .get(&refund.user_id)
            .map(|u| u.name.clone())
            .unwrap_or_default();

        RefundWithOwner {
            refund: refund.clone(),
            user: RefundOwner { name },
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, input: NewUser) -> Result<User, RepositoryError> {
        // 중복 검사와 삽입을 같은 쓰기 잠금 안에서 수행
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == input.email) {
            return Err(RepositoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password: input.password,
            role: input.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }
}

#[async_trait]
impl RefundRepository for MemoryStore {
    async fn create(&self, input: NewRefund) -> Result<Refund, RepositoryError> {
        let now = Utc::now();
        let refund = Refund {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            amount: input.amount,
            filename: input.filename,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        self.refunds.write().await.push(refund.clone());

        Ok(refund)
    }

    async fn list(&self, filter: &RefundFilter) -> Result<RefundPage, RepositoryError> {
        let users = self.users.read().await;
        let refunds = self.refunds.read().await;
        let needle = filter.owner_name.trim().to_lowercase();

        let mut matched: Vec<&Refund> = refunds
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || users
                        .get(&r.user_id)
                        .is_some_and(|u| u.name.to_lowercase().contains(&needle))
            })
            .collect();

        // 최신순, 같은 시각이면 나중에 들어온 것이 먼저
        matched.reverse();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_records = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .map(|r| Self::with_owner(r, &users))
            .collect();

        Ok(RefundPage {
            items,
            total_records,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefundWithOwner>, RepositoryError> {
        let users = self.users.read().await;
        let refunds = self.refunds.read().await;

        Ok(refunds
            .iter()
            .find(|r| r.id == id)
            .map(|r| Self::with_owner(r, &users)))
    }
}
