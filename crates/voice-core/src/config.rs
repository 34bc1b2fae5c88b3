//! 인증 설정 관리.
//!
//! 토큰 비밀 키, 서명 알고리즘, 만료 시간, 비밀번호 해싱 비용을 정의합니다.
//! 프로세스 시작 시 한 번 로드되며 이후 변경되지 않습니다.
//!
//! # 환경변수
//!
//! - `ACCESS_SECRET`: 액세스 토큰 서명 키 (필수)
//! - `REFRESH_SECRET`: 리프레시 토큰 서명 키 (필수, `ACCESS_SECRET`과 달라야 함)
//! - `ALGORITHM`: `HS256` | `HS384` | `HS512` (기본값: `HS256`)
//! - `ACCESS_TTL_MINUTES`: 액세스 토큰 만료 시간 (기본값: 30분, 최대 1년)
//! - `REFRESH_TTL_DAYS`: 리프레시 토큰 만료 시간 (기본값: 7일, 최대 10년)
//! - `HASH_MEMORY_KIB`, `HASH_ITERATIONS`, `HASH_PARALLELISM`: Argon2 비용 파라미터

use std::collections::HashMap;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// 권장 최소 비밀 키 길이 (바이트).
const RECOMMENDED_SECRET_LEN: usize = 32;

/// 액세스 토큰 최대 만료 시간 (1년, 분 단위).
pub const MAX_ACCESS_TTL_MINUTES: i64 = 60 * 24 * 365;

/// 리프레시 토큰 최대 만료 시간 (10년, 일 단위).
pub const MAX_REFRESH_TTL_DAYS: i64 = 365 * 10;

/// 설정 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("필수 설정이 없습니다: {0}")]
    Missing(&'static str),
    #[error("ACCESS_SECRET과 REFRESH_SECRET은 서로 달라야 합니다")]
    SecretsNotDistinct,
    #[error("지원하지 않는 서명 알고리즘: {0} (HS256, HS384, HS512만 허용)")]
    UnsupportedAlgorithm(String),
    #[error("만료 시간이 허용 범위를 벗어났습니다: {0}")]
    InvalidTtl(&'static str),
    #[error("잘못된 해싱 파라미터: {0}")]
    InvalidHasherParams(String),
    #[error("설정 로드 실패: {0}")]
    Source(#[from] config::ConfigError),
}

/// Argon2 비용 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HasherConfig {
    /// Argon2 파라미터로 변환.
    pub fn to_params(&self) -> Result<argon2::Params, ConfigError> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| ConfigError::InvalidHasherParams(e.to_string()))
    }
}

/// 인증 설정.
///
/// 두 비밀 키는 서로 독립적인 값이어야 합니다. 같은 값이면 한 종류의 토큰이
/// 다른 종류의 검증 경로를 통과하게 되므로 로드 시점에 거부합니다.
#[derive(Debug)]
pub struct AuthConfig {
    /// 액세스 토큰 서명 키
    pub access_secret: SecretString,
    /// 리프레시 토큰 서명 키
    pub refresh_secret: SecretString,
    /// 서명 알고리즘 (HMAC 계열)
    pub algorithm: Algorithm,
    /// 액세스 토큰 만료 시간 (분)
    pub access_ttl_minutes: i64,
    /// 리프레시 토큰 만료 시간 (일)
    pub refresh_ttl_days: i64,
    /// 비밀번호 해싱 비용
    pub hasher: HasherConfig,
}

/// 환경변수에서 읽은 원시 값.
#[derive(Debug, Deserialize)]
struct RawAuthSettings {
    access_secret: Option<String>,
    refresh_secret: Option<String>,
    #[serde(default = "default_algorithm")]
    algorithm: String,
    #[serde(default = "default_access_ttl_minutes")]
    access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    refresh_ttl_days: i64,
    hash_memory_kib: Option<u32>,
    hash_iterations: Option<u32>,
    hash_parallelism: Option<u32>,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}
fn default_access_ttl_minutes() -> i64 {
    30
}
fn default_refresh_ttl_days() -> i64 {
    7
}

impl AuthConfig {
    /// 기본 알고리즘과 만료 시간으로 설정 생성.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: SecretString::from(access_secret.into()),
            refresh_secret: SecretString::from(refresh_secret.into()),
            algorithm: Algorithm::HS256,
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
            hasher: HasherConfig::default(),
        }
    }

    /// 만료 시간 설정.
    pub fn with_ttl(mut self, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        self.access_ttl_minutes = access_ttl_minutes;
        self.refresh_ttl_days = refresh_ttl_days;
        self
    }

    /// 해싱 비용 설정.
    pub fn with_hasher(mut self, hasher: HasherConfig) -> Self {
        self.hasher = hasher;
        self
    }

    /// 프로세스 환경변수에서 설정을 로드합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config::Environment::default())
    }

    /// 주어진 변수 맵에서 설정을 로드합니다.
    ///
    /// 키는 환경변수 이름 그대로 사용합니다 (예: `ACCESS_SECRET`).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, ConfigError> {
        let raw: RawAuthSettings = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let algorithm = Algorithm::from_str(raw.algorithm.trim())
            .map_err(|_| ConfigError::UnsupportedAlgorithm(raw.algorithm.clone()))?;

        let defaults = HasherConfig::default();
        let config = Self {
            access_secret: SecretString::from(
                raw.access_secret.ok_or(ConfigError::Missing("ACCESS_SECRET"))?,
            ),
            refresh_secret: SecretString::from(
                raw.refresh_secret.ok_or(ConfigError::Missing("REFRESH_SECRET"))?,
            ),
            algorithm,
            access_ttl_minutes: raw.access_ttl_minutes,
            refresh_ttl_days: raw.refresh_ttl_days,
            hasher: HasherConfig {
                memory_kib: raw.hash_memory_kib.unwrap_or(defaults.memory_kib),
                iterations: raw.hash_iterations.unwrap_or(defaults.iterations),
                parallelism: raw.hash_parallelism.unwrap_or(defaults.parallelism),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// 설정 유효성 검사.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let access = self.access_secret.expose_secret();
        let refresh = self.refresh_secret.expose_secret();

        if access.is_empty() {
            return Err(ConfigError::Missing("ACCESS_SECRET"));
        }
        if refresh.is_empty() {
            return Err(ConfigError::Missing("REFRESH_SECRET"));
        }
        if access == refresh {
            return Err(ConfigError::SecretsNotDistinct);
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{:?}", self.algorithm)));
        }
        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.access_ttl_minutes) {
            return Err(ConfigError::InvalidTtl("ACCESS_TTL_MINUTES"));
        }
        if !(1..=MAX_REFRESH_TTL_DAYS).contains(&self.refresh_ttl_days) {
            return Err(ConfigError::InvalidTtl("REFRESH_TTL_DAYS"));
        }
        self.hasher.to_params()?;

        if access.len() < RECOMMENDED_SECRET_LEN || refresh.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                recommended = RECOMMENDED_SECRET_LEN,
                "Token secret is shorter than recommended"
            );
        }

        Ok(())
    }
}
