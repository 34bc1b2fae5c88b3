//! 음성 인식 서비스 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 로그인/토큰 갱신 및 베어러 토큰 인증
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 인증 추출기 및 비밀번호 해싱 풀
//! - [`users`]: 사용자 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서

pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod users;

pub use auth::{AdminUser, CurrentUser, HashingPool};
pub use error::{ApiError, ApiErrorResponse};
pub use metrics::setup_metrics_recorder;
pub use middleware::{metrics_layer, RateLimitConfig, RateLimiter};
pub use routes::create_api_router;
pub use state::{AppState, StateError};
pub use users::{InMemoryUserStore, StoredUser, UserStore, UserSummary};
