//! 요청 본문 추출기.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON 역직렬화 후 `validator` 검사를 수행하는 추출기.
///
/// 본문 형식 오류와 검증 실패는 모두 `422 VALIDATION_ERROR`가 됩니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(validation_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// 필드 검증 에러를 하나의 메시지로 합침.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, StatusCode},
        response::IntoResponse,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "name은 비어 있을 수 없습니다"))]
        name: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"user"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "user");
    }

    #[tokio::test]
    async fn test_rejections_are_unprocessable() {
        for body in [r#"{"name":""}"#, r#"{"other":"x"}"#, "not json"] {
            let error = ValidatedJson::<Payload>::from_request(json_request(body), &())
                .await
                .unwrap_err();
            assert_eq!(
                error.into_response().status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn test_validation_message_uses_field_message() {
        let error = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":""}"#), &())
            .await
            .unwrap_err();

        match error {
            ApiError::Validation(message) => assert_eq!(message, "name은 비어 있을 수 없습니다"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
