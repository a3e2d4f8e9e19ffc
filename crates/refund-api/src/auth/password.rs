//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 비용: {0}")]
    InvalidCost(u32),
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하며 솔트는 자동으로 생성됩니다.
/// `cost`는 Argon2 time cost(반복 횟수)입니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트와 파라미터 포함)
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password", 8).unwrap();
/// // "$argon2id$v=19$m=19456,t=8,p=1$..."
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        cost,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|_| PasswordError::InvalidCost(cost))?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 해시에 기록된 파라미터로 다시 계산해 비교합니다.
/// 해시 형식이 잘못된 경우도 불일치로 취급합니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
