//! 사용자 저장소.
//!
//! 사용자 영속화는 이 서비스 밖의 책임입니다. 인증 흐름은 [`UserStore`]
//! 트레이트를 통해서만 저장된 자격증명에 접근하며, 기본 구현으로 메모리
//! 저장소를 제공합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;
use voice_core::Role;

/// 저장된 사용자 자격증명.
///
/// 비밀번호는 `PasswordHasher`가 만든 해시로만 보관합니다.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl StoredUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

/// 외부에 노출되는 사용자 정보 (해시 제외).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&StoredUser> for UserSummary {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// 사용자 조회 트레이트.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 사용자 이름으로 조회.
    async fn find_by_username(&self, username: &str) -> Option<StoredUser>;

    /// 전체 사용자 목록.
    async fn list(&self) -> Vec<StoredUser>;
}

/// 메모리 기반 사용자 저장소.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 사용자들로 저장소 생성.
    pub fn with_users(users: impl IntoIterator<Item = StoredUser>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// 사용자 추가. 같은 이름이 있으면 교체합니다.
    pub async fn insert(&self, user: StoredUser) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Option<StoredUser> {
        self.users.read().await.get(username).cloned()
    }

    async fn list(&self) -> Vec<StoredUser> {
        let mut users: Vec<StoredUser> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}
