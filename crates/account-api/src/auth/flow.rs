//! 로그인, 갱신, 검증 흐름.
//!
//! 코덱/발급기/검증기/전송 계층을 조합합니다. 서명 키와 만료 정책은
//! 생성 시 고정되며 이후 변경되지 않습니다.

use account_core::JwtConfig;
use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use super::jwt::{IdentityClaims, SigningSecret};
use super::middleware::AuthError;
use super::password::{verify_password, PasswordError};
use super::tokens::{ExpiryPolicy, TokenIssuer, TokenPair, TokenValidator};
use super::transport::{extract_bearer, write_auth_cookies};
use crate::error::ApiError;
use crate::repository::UserStore;

/// 인증 흐름 오케스트레이터.
#[derive(Clone)]
pub struct AuthFlow {
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl AuthFlow {
    pub fn new(secret: &SigningSecret, policy: ExpiryPolicy) -> Self {
        Self {
            issuer: TokenIssuer::new(secret, policy),
            validator: TokenValidator::new(secret),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &SigningSecret::from(config.secret.clone()),
            ExpiryPolicy::from_config(config),
        )
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        self.issuer.policy()
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// 사용자 이름과 비밀번호로 로그인합니다.
    ///
    /// 이메일 로그인은 지원하지 않습니다. 사용자 이름이나 비밀번호가 비어 있으면 400,
    /// 사용자가 없으면 404, 비밀번호가 틀리면 401, 저장된 해시를 쓸 수 없으면 500.
    /// 사용자 이름은 공백을 제거하지 않고 그대로 조회합니다.
    pub async fn login(
        &self,
        store: &dyn UserStore,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, ApiError> {
        if username.is_empty() {
            return Err(ApiError::InvalidInput("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(ApiError::InvalidInput("Password is required".to_string()));
        }

        let user = store
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        match verify_password(password, &user.password_hash) {
            Ok(()) => {}
            Err(PasswordError::VerificationFailed) => {
                warn!(user_id = user.id, "로그인 실패: 비밀번호 불일치");
                return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
            }
            Err(e) => {
                error!(user_id = user.id, error = %e, "저장된 비밀번호 해시를 사용할 수 없습니다");
                return Err(ApiError::Internal("비밀번호 검증 실패".to_string()));
            }
        }

        let pair = self.issuer.issue(&user.identity())?;
        info!(user_id = user.id, username = %user.username, "로그인 성공");

        Ok(pair)
    }

    /// Bearer 토큰을 검증하고 클레임을 반환합니다.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<IdentityClaims, AuthError> {
        let token = extract_bearer(headers)?;
        Ok(self.validator.validate(token)?)
    }

    /// 제시된 토큰의 클레임만으로 새 토큰 페어를 발급합니다.
    ///
    /// 저장소를 다시 조회하지 않으며 access/refresh 토큰 모두 허용합니다.
    pub fn refresh(&self, headers: &HeaderMap) -> Result<TokenPair, AuthError> {
        let claims = self.authenticate(headers)?;
        let pair = self.issuer.issue(&claims.identity())?;
        info!(user_id = claims.user_id, "토큰 갱신");

        Ok(pair)
    }

    /// 쿠키와 본문에 토큰 페어를 담은 응답.
    pub fn token_response(&self, pair: TokenPair) -> Result<Response, AuthError> {
        let policy = self.policy();
        let mut headers = HeaderMap::new();
        write_auth_cookies(
            &mut headers,
            &pair.access,
            &pair.refresh,
            policy.access_ttl,
            policy.refresh_ttl,
        )?;

        Ok((headers, Json(pair)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::TokenError;
    use crate::repository::{MemoryUserStore, NewUser};
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn flow() -> AuthFlow {
        AuthFlow::new(&SigningSecret::new(TEST_SECRET), ExpiryPolicy::new(3600, 25200))
    }

    async fn store_with_alice() -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: hash_password("correct-pw").unwrap(),
            })
            .await
            .unwrap();
        store
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let store = store_with_alice().await;
        let flow = flow();

        let pair = flow.login(&store, "alice", "correct-pw").await.unwrap();
        assert!(!pair.access.is_empty());
        assert!(!pair.refresh.is_empty());

        assert!(matches!(
            flow.login(&store, "alice", "wrong-pw").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            flow.login(&store, "nobody", "correct-pw").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            flow.login(&store, "", "correct-pw").await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            flow.login(&store, "alice", "").await,
            Err(ApiError::InvalidInput(_))
        ));
        // 공백 이름은 그대로 조회되어 없는 사용자로 처리
        assert!(matches!(
            flow.login(&store, "   ", "correct-pw").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_unusable_stored_hash_is_internal() {
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                username: "legacy".to_string(),
                email: "legacy@example.com".to_string(),
                password_hash: "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA"
                    .to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(
            flow().login(&store, "legacy", "pw").await,
            Err(ApiError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_accepts_access_token() {
        let store = store_with_alice().await;
        let flow = flow();
        let pair = flow.login(&store, "alice", "correct-pw").await.unwrap();

        let refreshed = flow.refresh(&bearer(&pair.access)).unwrap();
        let claims = flow.validator().validate(&refreshed.access).unwrap();

        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
        assert_ne!(refreshed.access, pair.access);
    }

    #[test]
    fn test_authenticate_rejects_foreign_token() {
        let other = AuthFlow::new(
            &SigningSecret::new("wrong-secret-key-for-testing-minimum-32-chars"),
            ExpiryPolicy::new(3600, 25200),
        );
        let pair = other
            .issuer()
            .issue(&account_core::UserIdentity::new(1, "alice"))
            .unwrap();

        assert!(matches!(
            flow().authenticate(&bearer(&pair.access)),
            Err(AuthError::Token(TokenError::InvalidSignature))
        ));
    }
}
