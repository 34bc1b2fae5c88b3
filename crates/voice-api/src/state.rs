//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다. 토큰 서비스와
//! 검증기는 시작 시 한 번 로드된 [`AuthConfig`]로 생성합니다.

use std::sync::Arc;

use thiserror::Error;
use voice_core::{AuthConfig, ConfigError, PasswordError, PasswordHasher, TokenService, TokenVerifier};

use crate::auth::HashingPool;
use crate::users::UserStore;

/// 상태 생성 에러.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("인증 설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("비밀번호 해싱 초기화 실패: {0}")]
    Password(#[from] PasswordError),
}

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 쌍 발급
    pub tokens: Arc<TokenService>,

    /// 액세스/리프레시 토큰 검증
    pub verifier: Arc<TokenVerifier>,

    /// 동시 실행 수가 제한된 비밀번호 해싱
    pub hashing: HashingPool,

    /// 사용자 조회
    pub users: Arc<dyn UserStore>,

    /// 서버 시작 시각
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새 상태 생성.
    ///
    /// 설정을 검증한 뒤 해셔, 토큰 서비스, 검증기를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `config` - 인증 설정
    /// * `users` - 사용자 저장소
    /// * `hash_concurrency` - 동시 해싱 작업 수
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        hash_concurrency: usize,
    ) -> Result<Self, StateError> {
        config.validate()?;

        let hasher = PasswordHasher::new(&config.hasher)?;
        let hashing = HashingPool::new(hasher, hash_concurrency)?;

        Ok(Self {
            tokens: Arc::new(TokenService::new(config)),
            verifier: Arc::new(TokenVerifier::new(config)),
            hashing,
            users,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("verifier", &self.verifier)
            .field("hashing", &self.hashing)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::InMemoryUserStore;
    use voice_core::HasherConfig;

    fn config() -> AuthConfig {
        AuthConfig::new(
            "access-secret-for-tests-0123456789abcdef",
            "refresh-secret-for-tests-0123456789abcdef",
        )
        .with_hasher(HasherConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_new_state() {
        let state = AppState::new(&config(), Arc::new(InMemoryUserStore::new()), 2).unwrap();

        assert_eq!(state.hashing.max_concurrent(), 2);
        assert!(state.uptime_secs() >= 0);
        assert!(!state.version.is_empty());
    }

    #[test]
    fn test_new_state_rejects_shared_secret() {
        let config = AuthConfig::new("same-secret", "same-secret");
        let result = AppState::new(&config, Arc::new(InMemoryUserStore::new()), 1);

        assert!(matches!(
            result,
            Err(StateError::Config(ConfigError::SecretsNotDistinct))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let state = AppState::new(&config(), Arc::new(InMemoryUserStore::new()), 1).unwrap();
        let debug = format!("{:?}", state);

        assert!(!debug.contains("access-secret-for-tests"));
    }
}
