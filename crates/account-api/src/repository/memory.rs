//! 메모리 기반 사용자 저장소.
//!
//! PostgreSQL 저장소와 같은 고유성 규칙을 적용합니다. 테스트와 로컬 실행에 사용합니다.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::users::{NewUser, StoreError, StoredUser, UserChanges, UserStore};

#[derive(Default)]
struct Inner {
    users: Vec<StoredUser>,
    next_id: i64,
}

/// 메모리 사용자 저장소.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<StoredUser, StoreError> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let stored = StoredUser {
            id: inner.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredUser>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<StoredUser, StoreError> {
        let mut inner = self.inner.write().await;

        let taken = inner.users.iter().any(|u| {
            u.id != id
                && (changes.username() == Some(u.username.as_str())
                    || changes.email() == Some(u.email.as_str()))
        });

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;

        if taken {
            return Err(StoreError::Conflict);
        }

        if let Some(username) = changes.username() {
            user.username = username.to_string();
        }
        if let Some(email) = changes.email() {
            user.email = email.to_string();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let created = store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(
            store.find_by_username("alice").await.unwrap().unwrap().id,
            1
        );
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryUserStore::new();
        store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            store.create(new_user("alice", "other@example.com")).await,
            Err(StoreError::Conflict)
        ));
        assert!(matches!(
            store.create(new_user("bob", "alice@example.com")).await,
            Err(StoreError::Conflict)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_leaves_empty_fields_unchanged() {
        let store = MemoryUserStore::new();
        let alice = store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let updated = store
            .update(
                alice.id,
                UserChanges {
                    username: Some(String::new()),
                    email: Some("new@example.com".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "new@example.com");
        assert!(updated.updated_at >= alice.updated_at);
    }

    #[tokio::test]
    async fn test_update_conflict_and_not_found() {
        let store = MemoryUserStore::new();
        let alice = store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        store
            .create(new_user("bob", "bob@example.com"))
            .await
            .unwrap();

        let result = store
            .update(
                alice.id,
                UserChanges {
                    username: Some("bob".to_string()),
                    email: None,
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict)));

        let result = store.update(42, UserChanges::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
