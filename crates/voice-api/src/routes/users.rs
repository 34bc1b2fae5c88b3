//! 사용자 관리 endpoint (관리자 전용).

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AdminUser;
use crate::error::ApiErrorResponse;
use crate::state::AppState;
use crate::users::UserSummary;

/// 사용자 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

/// 전체 사용자 목록.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "사용자 목록", body = UserListResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse),
        (status = 403, description = "관리자 권한 필요", body = ApiErrorResponse)
    )
)]
pub async fn list_users(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Json<UserListResponse> {
    let users: Vec<UserSummary> = state.users.list().await.iter().map(UserSummary::from).collect();

    tracing::debug!(admin_id = %admin.id, count = users.len(), "Listed users");

    Json(UserListResponse { users })
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_users))
}
