//! 사용자 저장소.
//!
//! username/email 고유성은 저장소가 보장합니다. 위반 시 `StoreError::Conflict`.

use account_core::{UserIdentity, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("이미 존재하는 사용자 이름 또는 이메일")]
    Conflict,
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
}

/// 저장된 사용자 행 (비밀번호 해시 포함).
#[derive(Debug, Clone, FromRow)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// 외부 노출용 레코드 (해시 제외).
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.username.clone())
    }
}

/// 새 사용자 입력.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// 사용자 수정 입력.
///
/// `None`이거나 빈 문자열인 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    /// 실제로 바뀌는 username.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|s| !s.is_empty())
    }

    /// 실제로 바뀌는 email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.username().is_none() && self.email().is_none()
    }
}

/// 사용자 저장소 trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<StoredUser, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredUser>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError>;

    /// 변경된 행을 반환합니다. 행이 없으면 `NotFound`.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<StoredUser, StoreError>;

    /// 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError>;
}

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

/// PostgreSQL 사용자 저장소.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `users` 테이블이 없으면 생성합니다.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("users 테이블 준비 완료");
        Ok(())
    }
}

/// 고유 제약 위반(23505)은 Conflict로 변환.
fn map_db_error(e: sqlx::Error) -> StoreError {
    if e
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
    {
        StoreError::Conflict
    } else {
        StoreError::Database(e)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<StoredUser, StoreError> {
        sqlx::query_as::<_, StoredUser>(&format!(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredUser>, StoreError> {
        let user = sqlx::query_as::<_, StoredUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        let user = sqlx::query_as::<_, StoredUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<StoredUser, StoreError> {
        sqlx::query_as::<_, StoredUser>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username())
        .bind(changes.email())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
