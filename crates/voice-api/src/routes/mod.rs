//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크
//! - `/api/v1/auth` - 로그인, 토큰 갱신, 현재 사용자
//! - `/api/v1/users` - 사용자 목록 (관리자 전용)

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest, MeResponse, RefreshRequest};
pub use health::{health_router, HealthResponse};
pub use users::{users_router, UserListResponse};

use axum::Router;
use std::sync::Arc;

use crate::middleware::RateLimiter;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// `auth_rate_limit`이 주어지면 로그인과 토큰 갱신에만 IP별 요청 제한을 적용합니다.
pub fn create_api_router(auth_rate_limit: Option<RateLimiter>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router(auth_rate_limit))
        .nest("/api/v1/users", users_router())
}
