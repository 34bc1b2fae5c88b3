//! 동시 실행 수가 제한된 비밀번호 해싱.
//!
//! Argon2 해싱은 의도적으로 CPU 비용이 높으므로 async 워커 스레드를 막지
//! 않도록 `spawn_blocking`에서 실행하고, 세마포어로 동시 실행 수를 제한하여
//! 로그인 폭주 시 CPU 고갈을 막습니다.

use std::sync::Arc;

use tokio::sync::Semaphore;
use voice_core::{PasswordError, PasswordHasher};

/// 해싱 작업 풀.
#[derive(Debug, Clone)]
pub struct HashingPool {
    hasher: Arc<PasswordHasher>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    /// 존재하지 않는 사용자 로그인 시 비교용 해시
    dummy_hash: Arc<str>,
}

impl HashingPool {
    /// 새 해싱 풀 생성.
    ///
    /// 미존재 사용자 검증용 해시를 한 번 계산하므로 해싱 비용만큼 시간이 걸립니다.
    ///
    /// # Arguments
    ///
    /// * `hasher` - 비밀번호 해셔
    /// * `max_concurrent` - 동시에 실행할 최대 해싱 작업 수 (최소 1)
    pub fn new(hasher: PasswordHasher, max_concurrent: usize) -> Result<Self, PasswordError> {
        let max_concurrent = max_concurrent.max(1);
        let dummy_hash = hasher.hash("dummy-password-for-unknown-users")?;

        Ok(Self {
            hasher: Arc::new(hasher),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// 존재하지 않는 사용자에 대해 비교할 해시.
    ///
    /// 사용자 존재 여부와 관계없이 검증 시간이 같도록 사용합니다.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// 최대 동시 실행 수.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// 현재 사용 가능한 슬롯 수.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// 비밀번호 해싱.
    pub async fn hash(&self, plaintext: String) -> Result<String, PasswordError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PasswordError::HashingFailed)?;
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.hash(&plaintext)
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            PasswordError::HashingFailed
        })?
    }

    /// 비밀번호 검증.
    ///
    /// 작업 실패를 포함한 모든 실패는 `false`입니다.
    pub async fn verify(&self, plaintext: String, hash: String) -> bool {
        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return false;
        };
        let hasher = self.hasher.clone();

        // 요청이 취소되어도 슬롯은 계산이 끝날 때 반환됨
        match tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.verify(&plaintext, &hash)
        })
        .await
        {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}
