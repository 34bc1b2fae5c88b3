//! 인증 endpoint.
//!
//! - `POST /api/v1/auth/login` - 사용자 이름/비밀번호로 토큰 쌍 발급
//! - `POST /api/v1/auth/refresh` - 리프레시 토큰으로 토큰 쌍 재발급
//! - `GET /api/v1/auth/me` - 현재 토큰의 식별 정보

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;
use voice_core::{AuthError, Identity, TokenPair};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiErrorResponse};
use crate::extract::ValidatedJson;
use crate::metrics::{
    record_login, record_password_verify_duration, record_token_issued, record_token_rejection,
};
use crate::middleware::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름
    pub username: String,
    /// 비밀번호
    pub password: String,
}

/// 토큰 갱신 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// 로그인 시 발급된 리프레시 토큰
    pub refresh_token: String,
}

/// 현재 사용자 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// 사용자 ID
    pub id: uuid::Uuid,
    /// 역할
    pub role: voice_core::Role,
}

impl From<Identity> for MeResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
        }
    }
}

/// 로그인.
///
/// 존재하지 않는 사용자도 더미 해시로 검증을 수행하여 응답 시간으로 사용자
/// 존재 여부가 드러나지 않게 합니다. 두 경우 모두 같은 401 응답을 반환합니다.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급 성공", body = TokenPair),
        (status = 401, description = "잘못된 사용자 이름 또는 비밀번호", body = ApiErrorResponse),
        (status = 422, description = "요청 본문 형식 오류", body = ApiErrorResponse),
        (status = 429, description = "요청 제한 초과", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state.users.find_by_username(&request.username).await;

    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.hashing.dummy_hash().to_string(),
    };

    let started = Instant::now();
    let matched = state.hashing.verify(request.password, hash).await;
    record_password_verify_duration(started.elapsed().as_secs_f64());

    let user = match user {
        Some(user) if matched => user,
        _ => {
            record_login("invalid_credentials");
            warn!(username = %request.username, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let identity = Identity::new(user.id, user.role);
    let pair = state.tokens.issue(&identity).inspect_err(|_| record_login("error"))?;

    record_login("success");
    record_token_issued("login");
    info!(user_id = %identity.id, role = %identity.role, "User logged in");

    Ok(Json(pair))
}

/// 토큰 갱신.
///
/// 리프레시 토큰의 식별 정보로 새 토큰 쌍을 발급합니다. 기존 리프레시 토큰은
/// 만료될 때까지 계속 유효합니다.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "토큰 재발급 성공", body = TokenPair),
        (status = 401, description = "유효하지 않거나 만료된 리프레시 토큰", body = ApiErrorResponse),
        (status = 422, description = "요청 본문 형식 오류", body = ApiErrorResponse),
        (status = 429, description = "요청 제한 초과", body = ApiErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let identity = state
        .verifier
        .verify_refresh(&request.refresh_token)
        .inspect_err(|e| match e {
            AuthError::TokenExpired(_) => record_token_rejection("refresh", "expired"),
            _ => record_token_rejection("refresh", "invalid"),
        })?;

    let pair = state.tokens.issue(&identity)?;

    record_token_issued("refresh");
    info!(user_id = %identity.id, "Token pair refreshed");

    Ok(Json(pair))
}

/// 현재 토큰의 식별 정보.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "현재 사용자", body = MeResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    )
)]
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<MeResponse> {
    Json(identity.into())
}

/// 인증 라우터 생성.
///
/// `rate_limit`이 주어지면 로그인과 토큰 갱신에만 IP별 요청 제한을 적용합니다.
pub fn auth_router(rate_limit: Option<RateLimiter>) -> Router<Arc<AppState>> {
    let credentials = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh));
    let credentials = match rate_limit {
        Some(limiter) => credentials.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        )),
        None => credentials,
    };

    credentials.route("/me", get(me))
}
