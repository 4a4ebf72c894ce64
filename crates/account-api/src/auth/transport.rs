//! 토큰 전송: Authorization 헤더 읽기와 인증 쿠키 쓰기.

use axum::http::{
    header::{AUTHORIZATION, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use super::middleware::AuthError;

/// Access Token 쿠키 이름.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Refresh Token 쿠키 이름.
pub const REFRESH_COOKIE: &str = "refreshToken";

const BEARER_PREFIX: &str = "Bearer ";

/// Authorization 헤더에서 Bearer 토큰을 꺼냅니다.
///
/// 헤더가 없거나 비어 있거나 접두사 뒤가 비어 있으면 `MissingCredential`,
/// `Bearer ` 접두사가 없으면 `Malformed`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    if value.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let token = match value.strip_prefix(BEARER_PREFIX) {
        Some(token) => token,
        // HTTP 파서가 끝 공백을 제거하므로 "Bearer "는 "Bearer"로 도착함
        None if value == BEARER_PREFIX.trim_end() => "",
        None => return Err(AuthError::Malformed),
    };

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

/// 인증 쿠키 Set-Cookie 값.
fn auth_cookie(name: &str, value: &str, max_age: i64) -> String {
    format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; Secure")
}

/// 두 토큰을 HttpOnly/Secure 쿠키로 기록합니다.
///
/// 쿠키 Max-Age는 토큰 유효 기간과 별개로 `access_ttl * 24`,
/// `refresh_ttl * 24 * 7`입니다.
pub fn write_auth_cookies(
    headers: &mut HeaderMap,
    access_token: &str,
    refresh_token: &str,
    access_ttl: i64,
    refresh_ttl: i64,
) -> Result<(), AuthError> {
    let max_age = |ttl: i64, factor: i64| {
        ttl.checked_mul(factor)
            .ok_or_else(|| AuthError::Internal(format!("쿠키 Max-Age 범위 초과: {ttl}s")))
    };
    let cookies = [
        auth_cookie(ACCESS_COOKIE, access_token, max_age(access_ttl, 24)?),
        auth_cookie(REFRESH_COOKIE, refresh_token, max_age(refresh_ttl, 24 * 7)?),
    ];

    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AuthError::Internal(format!("쿠키 헤더 생성 실패: {e}")))?;
        headers.append(SET_COOKIE, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_credential_cases() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("")),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Bearer ")),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Bearer")),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_malformed() {
        assert!(matches!(
            extract_bearer(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::Malformed)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("bearer abc")),
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn test_write_auth_cookies() {
        let mut headers = HeaderMap::new();
        write_auth_cookies(&mut headers, "acc", "ref", 3600, 25200).unwrap();

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(
            cookies,
            vec![
                "accessToken=acc; Path=/; Max-Age=86400; HttpOnly; Secure".to_string(),
                "refreshToken=ref; Path=/; Max-Age=4233600; HttpOnly; Secure".to_string(),
            ]
        );
    }

    #[test]
    fn test_overflowing_max_age_is_internal_error() {
        let mut headers = HeaderMap::new();
        let result = write_auth_cookies(&mut headers, "acc", "ref", 3600, i64::MAX / 24);

        assert!(matches!(result, Err(AuthError::Internal(_))));
        assert!(headers.get(SET_COOKIE).is_none());
    }
}
