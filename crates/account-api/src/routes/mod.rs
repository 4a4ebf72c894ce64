//! REST API 라우트.
//!
//! - `/`: 인사 메시지
//! - `/health`: 헬스 체크
//! - `/api/jwt`: 토큰 발급/갱신/검증
//! - `/api/users`: 계정 생성/수정/조회

pub mod greeting;
pub mod health;
pub mod jwt;
pub mod users;

use std::sync::Arc;

use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use greeting::{greet, greeting_router, GreetingQuery};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use jwt::{jwt_router, LoginRequest};
pub use users::{users_router, CreateUserRequest, UpdateUserRequest};

use crate::state::AppState;

/// 단순 메시지 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(greeting_router())
        .merge(health_router())
        .merge(jwt_router())
        .merge(users_router())
}
