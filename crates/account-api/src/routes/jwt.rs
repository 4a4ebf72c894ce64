//! 토큰 발급/갱신/검증 endpoint.
//!
//! - `POST /api/jwt/login`
//! - `GET /api/jwt/refresh`
//! - `GET /api/jwt/validate`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{IdentityClaims, JwtAuth, TokenPair};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름 (이메일 로그인 미지원)
    #[serde(default)]
    pub username: String,
    /// 비밀번호
    #[serde(default)]
    pub password: String,
}

/// 로그인.
///
/// 성공 시 토큰 페어를 본문과 `accessToken`/`refreshToken` 쿠키로 반환합니다.
#[utoipa::path(
    post,
    path = "/api/jwt/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = TokenPair),
        (status = 400, description = "사용자 이름 또는 비밀번호 누락", body = ApiErrorResponse),
        (status = 401, description = "비밀번호 불일치", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse),
        (status = 500, description = "토큰 생성 실패", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(credentials) = payload?;

    let pair = state
        .auth
        .login(
            state.store.as_ref(),
            &credentials.username,
            &credentials.password,
        )
        .await?;

    Ok(state.auth.token_response(pair)?)
}

/// 토큰 갱신.
///
/// Bearer 토큰의 클레임으로 새 페어를 발급합니다. access 토큰도 허용됩니다.
#[utoipa::path(
    get,
    path = "/api/jwt/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "갱신 성공", body = TokenPair),
        (status = 401, description = "토큰 없음 또는 무효", body = ApiErrorResponse),
        (status = 500, description = "토큰 생성 실패", body = ApiErrorResponse)
    )
)]
pub async fn refresh(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Response> {
    let pair = state.auth.refresh(&headers)?;
    Ok(state.auth.token_response(pair)?)
}

/// 토큰 검증.
#[utoipa::path(
    get,
    path = "/api/jwt/validate",
    tag = "auth",
    responses(
        (status = 200, description = "유효한 토큰의 클레임", body = IdentityClaims),
        (status = 401, description = "토큰 없음 또는 무효", body = ApiErrorResponse)
    )
)]
pub async fn validate(JwtAuth(claims): JwtAuth) -> Json<IdentityClaims> {
    Json(claims)
}

/// JWT 라우터 생성.
pub fn jwt_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/jwt/login", post(login))
        .route("/api/jwt/refresh", get(refresh))
        .route("/api/jwt/validate", get(validate))
}
