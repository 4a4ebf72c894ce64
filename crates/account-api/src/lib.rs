//! 계정 서비스 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - HS256 JWT access/refresh 토큰 발급과 검증
//! - 사용자 저장소 (PostgreSQL, 메모리)
//! - 계정 변경 시 생명주기 이벤트 발행
//! - 헬스 체크 및 OpenAPI 문서
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰 코덱, 발급/검증, 인증 추출기
//! - [`repository`]: 사용자 저장소
//! - [`error`]: 통합 에러 응답
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{AuthError, AuthFlow, IdentityClaims, JwtAuth, TokenError, TokenPair};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use repository::{MemoryUserStore, PgUserStore, StoreError, UserStore};
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_JWT_SECRET};
