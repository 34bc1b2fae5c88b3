//! Axum용 베어러 토큰 인증 추출기.
//!
//! `Authorization: Bearer <token>` 헤더에서 액세스 토큰을 꺼내 검증하고,
//! 검증된 [`Identity`]를 핸들러에 전달합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
//!     format!("Authenticated user: {}", identity.id)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use voice_core::{require_role, AuthError, Identity, Role};

use crate::error::ApiError;
use crate::metrics::record_token_rejection;
use crate::state::AppState;

/// 인증된 사용자 추출기.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

/// Admin 권한을 요구하는 추출기.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Identity);

/// Authorization 헤더에서 베어러 토큰 추출.
///
/// 스킴 이름은 대소문자를 구분하지 않습니다.
pub fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::MissingToken)?
        .to_str()
        .map_err(|_| ApiError::InvalidAuthHeader)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(ApiError::InvalidAuthHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::InvalidAuthHeader);
    }

    Ok(token)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let identity = state.verifier.verify_access(token).map_err(|e| {
            match &e {
                AuthError::TokenExpired(_) => record_token_rejection("access", "expired"),
                _ => record_token_rejection("access", "invalid"),
            }
            ApiError::from(e)
        })?;

        Ok(CurrentUser(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;
        require_role(&identity, Role::Admin)?;
        Ok(AdminUser(identity))
    }
}
