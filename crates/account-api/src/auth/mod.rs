//! 인증.
//!
//! HS256 JWT 기반 access/refresh 토큰 발급과 검증을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`ClaimCodec`]: 클레임 인코딩/디코딩 및 서명 검증
//! - [`TokenIssuer`] / [`TokenValidator`]: 토큰 페어 발급과 만료 검증
//! - [`extract_bearer`] / [`write_auth_cookies`]: 헤더와 쿠키 전송
//! - [`JwtAuth`]: Axum 핸들러용 인증 추출기
//! - [`AuthFlow`]: 로그인, 갱신, 검증 흐름
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.username)
//! }
//! ```

mod flow;
mod jwt;
mod middleware;
mod password;
mod tokens;
mod transport;

pub use flow::AuthFlow;
pub use jwt::{
    ClaimCodec, IdentityClaims, SigningSecret, TokenError, SIGNING_ALGORITHM, TOKEN_ISSUER,
    TOKEN_SUBJECT,
};
pub use middleware::{AuthError, JwtAuth};
pub use password::{hash_password, verify_password, PasswordError};
pub use tokens::{ExpiryPolicy, TokenIssuer, TokenPair, TokenValidator};
pub use transport::{extract_bearer, write_auth_cookies, ACCESS_COOKIE, REFRESH_COOKIE};
