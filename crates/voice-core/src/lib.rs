//! # Voice Core
//!
//! 음성 인식 API의 인증/인가 핵심 기능을 제공합니다.
//!
//! - 비밀번호 해싱 및 검증 (Argon2id)
//! - 액세스/리프레시 토큰 발급 및 검증 (HMAC JWT)
//! - 역할 기반 접근 제어
//! - 인증 설정 로드
//! - 로깅 인프라
//!
//! 세션 관리, 토큰 저장/폐기, 다단계 인증은 다루지 않습니다. 발급된 토큰은
//! 만료될 때까지 유효합니다.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;

pub use auth::{
    require_role, ClaimsMap, Identity, JwtError, PasswordError, PasswordHasher, Role, TokenCodec,
    TokenPair, TokenService, TokenVerifier, TOKEN_TYPE,
};
pub use config::{AuthConfig, ConfigError, HasherConfig};
pub use error::{AuthError, AuthResult, TokenClass};
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
