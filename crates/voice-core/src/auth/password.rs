//! 비밀번호 해싱.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::{ConfigError, HasherConfig};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 비밀번호 해셔.
///
/// 비용 파라미터는 생성 시 고정되며 해싱에만 사용됩니다. 검증은 해시 문자열에
/// 기록된 파라미터를 따르므로 비용을 바꿔도 기존 해시는 계속 검증됩니다.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// 설정된 비용 파라미터로 해셔 생성.
    pub fn new(config: &HasherConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            params: config.to_params()?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// 비밀번호 해싱.
    ///
    /// 호출마다 새 솔트를 OS 난수 생성기에서 뽑으므로 같은 비밀번호도 매번
    /// 다른 결과가 나옵니다.
    ///
    /// # Returns
    ///
    /// PHC 형식의 해시 문자열 (알고리즘, 파라미터, 솔트, 다이제스트 포함)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let hash = hasher.hash("my_secure_password")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 해시에 기록된 파라미터로 다시 계산하여 상수 시간으로 비교합니다.
    /// 불일치하거나 해시 문자열을 파싱할 수 없으면 `false`를 반환합니다.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash is not parseable");
                return false;
            }
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 테스트 속도를 위한 낮은 비용의 해셔.
    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&HasherConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("test_password").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("test_password", &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("test_password").unwrap();
        let hash2 = hasher.hash("test_password").unwrap();

        // 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("test_password", &hash1));
        assert!(hasher.verify("test_password", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$argon2id$v=19$m=abc$$"));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let cheap = fast_hasher();
        let default = PasswordHasher::default();

        let hash = cheap.hash("password").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));

        // 다른 비용으로 구성된 해셔도 기존 해시를 검증할 수 있어야 함
        assert!(default.verify("password", &hash));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("한글패스워드123").unwrap();
        assert!(hasher.verify("한글패스워드123", &hash));
    }

    #[test]
    fn test_empty_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("").unwrap();
        assert!(hasher.verify("", &hash));
        assert!(!hasher.verify(" ", &hash));
    }
}
