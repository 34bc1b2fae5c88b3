//! HTTP 인증 계층.
//!
//! 토큰 발급/검증 자체는 `voice-core`가 담당하고, 이 모듈은 요청에서
//! 베어러 토큰을 추출하는 추출기와 비밀번호 해싱 작업 풀을 제공합니다.

mod hashing;
mod middleware;

pub use hashing::HashingPool;
pub use middleware::{bearer_token, AdminUser, CurrentUser};
