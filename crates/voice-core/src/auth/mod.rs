//! 인증 및 권한 부여.
//!
//! JWT 기반 토큰 발급/검증과 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`PasswordHasher`]: Argon2id 비밀번호 해싱/검증
//! - [`TokenCodec`]: 범용 서명 토큰 인코딩/디코딩
//! - [`TokenService`]: 액세스/리프레시 토큰 쌍 발급
//! - [`TokenVerifier`]: 토큰 종류별 검증 및 [`Identity`] 복원
//! - [`require_role`]: 역할 검사
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let config = AuthConfig::from_env()?;
//! let service = TokenService::new(&config);
//! let verifier = TokenVerifier::new(&config);
//!
//! let pair = service.issue(&Identity::new(user_id, Role::User))?;
//! let identity = verifier.verify_access(&pair.access_token)?;
//! require_role(&identity, Role::Admin)?;
//! ```

mod codec;
mod guard;
mod identity;
mod password;
mod role;
mod service;
mod verifier;

pub use codec::{ClaimsMap, JwtError, TokenCodec, EXP_CLAIM};
pub use guard::require_role;
pub use identity::Identity;
pub use password::{PasswordError, PasswordHasher};
pub use role::Role;
pub use service::{identity_claims, TokenPair, TokenService, TOKEN_TYPE};
pub use verifier::{parse_identity, TokenVerifier};
