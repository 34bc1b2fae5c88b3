//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성하고
//! `/api-docs/openapi.json`에서 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use voice_core::{Role, TokenPair};

use crate::error::ApiErrorResponse;
use crate::routes::{
    HealthResponse, LoginRequest, MeResponse, RefreshRequest, UserListResponse,
};
use crate::users::UserSummary;

/// 베어러 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Voice API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voice API",
        description = r#"
# 음성 인식 서비스 REST API

## 인증

`POST /api/v1/auth/login`으로 액세스/리프레시 토큰 쌍을 발급받습니다.
보호된 엔드포인트는 `Authorization: Bearer <access_token>` 헤더가 필요합니다.
액세스 토큰이 만료되면 `POST /api/v1/auth/refresh`로 재발급합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 로그인 및 토큰 발급"),
        (name = "users", description = "사용자 - 관리자 전용 사용자 조회")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            LoginRequest,
            RefreshRequest,
            TokenPair,
            MeResponse,
            Role,

            // ===== Users =====
            UserListResponse,
            UserSummary,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::me,
        crate::routes::users::list_users,
    )
)]
pub struct ApiDoc;

/// OpenAPI JSON 라우터 생성.
///
/// `/api-docs/openapi.json` 경로에 스펙을 마운트합니다.
pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Voice API"));

        assert!(json.contains("/health"));
        assert!(json.contains("/api/v1/auth/login"));
        assert!(json.contains("/api/v1/auth/refresh"));
        assert!(json.contains("/api/v1/auth/me"));
        assert!(json.contains("/api/v1/users"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("TokenPair"));
        assert!(json.contains("LoginRequest"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("bearer_auth"));
    }

    #[tokio::test]
    async fn test_openapi_router_serves_json() {
        use axum::{body::Body, http::Request, http::StatusCode};
        use tower::ServiceExt;

        let response = openapi_router::<()>()
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
