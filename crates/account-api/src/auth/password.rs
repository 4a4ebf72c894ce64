//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id PHC 문자열로 저장하고 검증합니다.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호를 해싱합니다. 솔트는 호출마다 새로 생성됩니다.
///
/// ```rust,ignore
/// let hash = hash_password("secret1").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 해시와 평문 비밀번호를 비교합니다.
///
/// 불일치만 `VerificationFailed`이고, 파싱할 수 없거나 Argon2로 검증할 수 없는
/// 해시(다른 알고리즘, 잘못된 파라미터)는 `InvalidHashFormat`입니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            password_hash::Error::Password => PasswordError::VerificationFailed,
            _ => PasswordError::InvalidHashFormat,
        })
}
