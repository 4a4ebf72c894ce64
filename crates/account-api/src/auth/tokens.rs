//! Access/Refresh 토큰 발급 및 검증.

use account_core::{JwtConfig, UserIdentity};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::jwt::{ClaimCodec, IdentityClaims, SigningSecret, TokenError};

/// 토큰 만료 정책 (초 단위).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Access Token 유효 기간
    pub access_ttl: i64,
    /// Refresh Token 유효 기간
    pub refresh_ttl: i64,
}

impl ExpiryPolicy {
    pub fn new(access_ttl: i64, refresh_ttl: i64) -> Self {
        Self {
            access_ttl,
            refresh_ttl,
        }
    }

    /// refresh 만료가 없으면 access의 7배를 사용합니다.
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.access_expiration, config.refresh_expiration())
    }
}

/// Access Token + Refresh Token 페어.
///
/// 로그인/갱신 응답 본문 형식 그대로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Access Token
    pub access: String,
    /// Refresh Token
    pub refresh: String,
}

/// 토큰 페어 발급기.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: ClaimCodec,
    policy: ExpiryPolicy,
}

impl TokenIssuer {
    pub fn new(secret: &SigningSecret, policy: ExpiryPolicy) -> Self {
        Self {
            codec: ClaimCodec::new(secret),
            policy,
        }
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    /// 같은 사용자 정보로 만료 기간만 다른 두 토큰을 발급합니다.
    pub fn issue(&self, identity: &UserIdentity) -> Result<TokenPair, TokenError> {
        let access = claims_for(identity, Utc::now(), self.policy.access_ttl)?;
        let refresh = claims_for(identity, Utc::now(), self.policy.refresh_ttl)?;

        Ok(TokenPair {
            access: self.codec.encode(&access)?,
            refresh: self.codec.encode(&refresh)?,
        })
    }
}

/// 만료 시각이 표현 범위를 넘으면 `Encoding` 에러.
fn claims_for(
    identity: &UserIdentity,
    issued_at: DateTime<Utc>,
    ttl_secs: i64,
) -> Result<IdentityClaims, TokenError> {
    let ttl = Duration::try_seconds(ttl_secs)
        .filter(|ttl| issued_at.checked_add_signed(*ttl).is_some())
        .ok_or_else(|| TokenError::Encoding(format!("token ttl out of range: {ttl_secs}s")))?;

    Ok(IdentityClaims::new(identity, issued_at, ttl))
}

/// 토큰 검증기.
///
/// access/refresh 토큰을 구분하지 않고 동일하게 검증합니다.
#[derive(Clone)]
pub struct TokenValidator {
    codec: ClaimCodec,
}

impl TokenValidator {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            codec: ClaimCodec::new(secret),
        }
    }

    /// 서명과 만료를 확인하고 클레임을 반환합니다.
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        let claims = self.codec.decode(token)?;
        let now = Utc::now().timestamp();

        if claims.expires_at <= now {
            return Err(TokenError::Expired);
        }
        if claims.issued_at > now {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}
