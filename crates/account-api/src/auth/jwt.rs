//! JWT 클레임 코덱.
//!
//! HS256 서명 토큰의 인코딩/디코딩을 담당합니다. 만료 검사는 하지 않으며
//! [`TokenValidator`](super::TokenValidator)가 별도로 수행합니다.

use account_core::UserIdentity;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 발급자 클레임 값.
pub const TOKEN_ISSUER: &str = "app";
/// 주제 클레임 값.
pub const TOKEN_SUBJECT: &str = "user-auth";
/// 유일하게 허용하는 서명 알고리즘.
pub const SIGNING_ALGORITHM: &str = "HS256";

/// 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("지원하지 않는 서명 알고리즘: {0}")]
    UnsupportedAlgorithm(String),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(String),
}

/// 토큰에 담기는 사용자 식별 클레임.
///
/// 생성 후 변경되지 않습니다. 저장소에 기록되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityClaims {
    /// 사용자 ID
    #[serde(rename = "id")]
    pub user_id: i64,
    /// 사용자 이름
    pub username: String,
    /// 발급 시각 (Unix 초)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// 만료 시각 (Unix 초)
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// 발급자 (항상 "app")
    #[serde(rename = "iss")]
    pub issuer: String,
    /// 주제 (항상 "user-auth")
    #[serde(rename = "sub")]
    pub subject: String,
    /// 토큰 고유 식별자
    #[serde(rename = "jti")]
    pub token_id: String,
}

impl IdentityClaims {
    /// `issued_at` 기준으로 `ttl` 뒤에 만료되는 클레임을 생성합니다.
    pub fn new(identity: &UserIdentity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.username.clone(),
            issued_at: issued_at.timestamp(),
            expires_at: (issued_at + ttl).timestamp(),
            issuer: TOKEN_ISSUER.to_string(),
            subject: TOKEN_SUBJECT.to_string(),
            token_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// 클레임에서 사용자 식별 정보를 재구성합니다.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.user_id, self.username.clone())
    }
}

/// 프로세스 전역 서명 비밀 키.
///
/// 시작 시 한 번 로드되고 이후 읽기 전용입니다. `Debug` 출력에 노출되지 않습니다.
#[derive(Clone)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::from(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

impl From<SecretString> for SigningSecret {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

#[derive(Deserialize)]
struct TokenHeader {
    alg: String,
}

/// HS256 클레임 코덱.
#[derive(Clone)]
pub struct ClaimCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl ClaimCodec {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료/발급 시각 검사는 TokenValidator 담당
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 클레임을 서명된 토큰 문자열로 인코딩합니다.
    pub fn encode(&self, claims: &IdentityClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// 토큰을 디코딩하고 서명을 검증합니다.
    ///
    /// 세 부분 구조가 아니거나 base64url/JSON이 아니면 `Malformed`,
    /// 헤더 알고리즘이 HS256이 아니면 `UnsupportedAlgorithm`,
    /// 서명이 일치하지 않으면 `InvalidSignature`.
    pub fn decode(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(_), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        // jsonwebtoken은 알 수 없는 alg를 일반 파싱 에러로 돌려주므로 먼저 직접 확인
        let header: TokenHeader = URL_SAFE_NO_PAD
            .decode(header)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnsupportedAlgorithm(header.alg.clone())
                }
                _ => TokenError::Malformed,
            })
    }
}
