//! OpenAPI 문서화 설정.
//!
//! utoipa로 OpenAPI 3 스펙을 생성합니다. Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use account_core::UserRecord;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{IdentityClaims, TokenPair};
use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, CreateUserRequest, HealthResponse, LoginRequest,
    MessageResponse, UpdateUserRequest,
};

/// Account API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Account Service API",
        description = r#"
# 계정 서비스 REST API

JWT 기반 인증과 계정 생명주기 관리를 제공합니다.

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
로그인/갱신 응답은 `accessToken`, `refreshToken` 쿠키도 함께 설정합니다.

## 이벤트

계정 생성/수정이 성공하면 `user.created` / `user.updated` 이벤트가 RabbitMQ로 발행됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    tags(
        (name = "greeting", description = "인사"),
        (name = "health", description = "헬스 체크"),
        (name = "auth", description = "토큰 발급/갱신/검증"),
        (name = "users", description = "계정 관리")
    ),
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            MessageResponse,

            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Auth =====
            LoginRequest,
            TokenPair,
            IdentityClaims,

            // ===== Users =====
            CreateUserRequest,
            UpdateUserRequest,
            UserRecord,
        )
    ),
    paths(
        crate::routes::greeting::greet,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::jwt::login,
        crate::routes::jwt::refresh,
        crate::routes::jwt::validate,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::current_user,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
