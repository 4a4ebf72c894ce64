//! 계정 생성/수정/조회 endpoint.
//!
//! 저장소 변경이 성공하면 생명주기 이벤트를 별도 태스크로 발행합니다.
//! 발행 결과는 응답에 영향을 주지 않습니다.

use std::sync::Arc;

use account_core::{LifecycleEvent, UserRecord};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use validator::Validate;

use super::MessageResponse;
use crate::auth::{hash_password, JwtAuth};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::repository::{NewUser, UserChanges};
use crate::state::AppState;

/// 계정 생성 요청.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// 사용자 이름 (3~32자)
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    /// 이메일
    #[validate(email)]
    pub email: String,
    /// 비밀번호 (6자 이상)
    #[validate(length(min = 6))]
    pub password: String,
    /// 비밀번호 확인
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
}

/// 계정 수정 요청. 비어 있는 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    fn normalized(self) -> Self {
        Self {
            username: self.username.filter(|s| !s.is_empty()),
            email: self.email.filter(|s| !s.is_empty()),
        }
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        UserChanges {
            username: request.username,
            email: request.email,
        }
    }
}

/// 계정 생성.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "생성된 사용자", body = UserRecord),
        (status = 400, description = "입력값 검증 실패", body = ApiErrorResponse),
        (status = 409, description = "사용자 이름 또는 이메일 중복", body = ApiErrorResponse),
        (status = 500, description = "서버 오류", body = ApiErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserRecord>)> {
    let Json(request) = payload?;
    request.validate()?;

    let password_hash = hash_password(&request.password).map_err(|e| {
        error!(error = %e, "비밀번호 해싱 실패");
        ApiError::Internal(e.to_string())
    })?;

    let user = state
        .store
        .create(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
        })
        .await?
        .into_record();

    info!(user_id = user.id, username = %user.username, "사용자 생성");
    state.events.dispatch(LifecycleEvent::user_created(user.clone()));

    Ok((StatusCode::CREATED, Json(user)))
}

/// 인증된 사용자의 계정 수정.
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "수정 완료", body = MessageResponse),
        (status = 400, description = "입력값 검증 실패", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse),
        (status = 409, description = "사용자 이름 또는 이메일 중복", body = ApiErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    let request = request.normalized();
    request.validate()?;

    let changes = UserChanges::from(request);
    if changes.is_empty() {
        return Err(ApiError::InvalidInput("No fields to update".to_string()));
    }

    let user = state
        .store
        .update(claims.user_id, changes)
        .await?
        .into_record();

    info!(user_id = user.id, "사용자 정보 수정");
    state.events.dispatch(LifecycleEvent::user_updated(user));

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// 인증된 사용자 조회.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "현재 사용자", body = UserRecord),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    )
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<UserRecord>> {
    let user = state
        .store
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into_record()))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(create_user).put(update_user))
        .route("/api/users/me", get(current_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateUserRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_name = CreateUserRequest {
            username: "al".to_string(),
            ..valid.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = CreateUserRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let mismatch = CreateUserRequest {
            confirm_password: "secret2".to_string(),
            ..valid.clone()
        };
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));

        let short_password = CreateUserRequest {
            password: "12345".to_string(),
            confirm_password: "12345".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_update_request_ignores_empty_fields() {
        let request = UpdateUserRequest {
            username: Some(String::new()),
            email: Some("new@example.com".to_string()),
        }
        .normalized();

        assert!(request.validate().is_ok());
        assert!(request.username.is_none());

        let changes = UserChanges::from(request);
        assert_eq!(changes.email(), Some("new@example.com"));
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_update_request_validates_present_fields() {
        let request = UpdateUserRequest {
            username: Some("x".to_string()),
            email: None,
        }
        .normalized();

        assert!(request.validate().is_err());
    }
}
