//! Axum용 JWT 인증 추출기.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::jwt::{IdentityClaims, TokenError};
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 인증 에러.
///
/// 자격 증명 관련 실패는 모두 401, 토큰 생성 실패만 500입니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingCredential,
    #[error("잘못된 Authorization 헤더 형식")]
    Malformed,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingCredential => (StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL"),
            AuthError::Malformed => (StatusCode::UNAUTHORIZED, "MALFORMED_CREDENTIAL"),
            AuthError::Token(TokenError::Malformed) => (StatusCode::UNAUTHORIZED, "MALFORMED_TOKEN"),
            AuthError::Token(TokenError::InvalidSignature) => {
                (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
            }
            AuthError::Token(TokenError::UnsupportedAlgorithm(_)) => {
                (StatusCode::UNAUTHORIZED, "UNSUPPORTED_ALGORITHM")
            }
            AuthError::Token(TokenError::Expired) => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::Token(TokenError::Encoding(_)) | AuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_GENERATION_FAILED")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(error = %self, "토큰 생성 실패");
        } else {
            debug!(code, error = %self, "인증 거부");
        }

        (status, Json(ApiErrorResponse::new(code, self.to_string()))).into_response()
    }
}

/// JWT 인증 추출기.
///
/// ```rust,ignore
/// async fn protected_handler(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub IdentityClaims);

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.auth.authenticate(&parts.headers).map(JwtAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_statuses() {
        let unauthorized = vec![
            AuthError::MissingCredential,
            AuthError::Malformed,
            AuthError::Token(TokenError::Malformed),
            AuthError::Token(TokenError::InvalidSignature),
            AuthError::Token(TokenError::UnsupportedAlgorithm("none".to_string())),
            AuthError::Token(TokenError::Expired),
        ];

        for error in unauthorized {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }

        let internal = AuthError::Token(TokenError::Encoding("boom".to_string()));
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_carries_reason() {
        let response = AuthError::Token(TokenError::Expired).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "TOKEN_EXPIRED");
        assert_eq!(json["message"], "토큰이 만료되었습니다");
    }
}
