//! API 에러 응답.
//!
//! 모든 엔드포인트에서 같은 형식의 에러 본문을 반환합니다.
//!
//! ```json
//! {
//!   "code": "TOKEN_EXPIRED",
//!   "message": "액세스 토큰이 만료되었습니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use voice_core::AuthError;

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_CREDENTIALS", "TOKEN_EXPIRED", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프를 포함한 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러와 추출기가 반환하는 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Validation(String),
    #[error("내부 서버 오류가 발생했습니다")]
    Internal,
}

impl ApiError {
    /// HTTP 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            ApiError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "INVALID_AUTH_HEADER"),
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                }
                AuthError::TokenExpired(_) => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                AuthError::TokenInvalid(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                AuthError::TokenEncoding(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // 내부 에러의 상세 내용은 응답에 싣지 않음
        let message = match &self {
            ApiError::Auth(AuthError::TokenEncoding(detail)) => {
                tracing::error!(detail = %detail, "Token issuance failed");
                ApiError::Internal.to_string()
            }
            ApiError::Internal => {
                tracing::error!("Internal error while handling request");
                self.to_string()
            }
            _ => {
                tracing::debug!(code, error = %self, "Request rejected");
                self.to_string()
            }
        };

        let mut response = (status, Json(ApiErrorResponse::new(code, message))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_core::TokenClass;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert_eq!(error.to_string(), "[TEST_ERROR] Test message");
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (ApiError::MissingToken, StatusCode::UNAUTHORIZED),
            (ApiError::InvalidAuthHeader, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::TokenExpired(TokenClass::Access).into(), StatusCode::UNAUTHORIZED),
            (AuthError::TokenInvalid(TokenClass::Refresh).into(), StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden.into(), StatusCode::FORBIDDEN),
            (
                AuthError::TokenEncoding("boom".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = ApiError::MissingToken.into_response();
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = ApiError::from(AuthError::Forbidden).into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn test_internal_detail_not_leaked() {
        let response =
            ApiError::from(AuthError::TokenEncoding("secret detail".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error.code, "INTERNAL_ERROR");
        assert!(!error.message.contains("secret detail"));
    }
}
