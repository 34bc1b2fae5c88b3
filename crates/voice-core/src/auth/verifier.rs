//! 베어러 토큰 검증.
//!
//! 토큰 종류에 맞는 비밀 키로 디코딩한 뒤 클레임을 [`Identity`]로 변환합니다.
//! 잘못된 종류의 토큰은 서명 불일치로 `TokenInvalid`가 되며, 별도의 에러
//! 종류로 구분하지 않습니다.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use uuid::Uuid;

use super::codec::{ClaimsMap, JwtError, TokenCodec};
use super::{Identity, Role};
use crate::config::AuthConfig;
use crate::error::{AuthError, TokenClass};

/// 토큰 검증기.
pub struct TokenVerifier {
    codec: TokenCodec,
    access_secret: SecretString,
    refresh_secret: SecretString,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.codec.algorithm())
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            codec: TokenCodec::new(config.algorithm),
            access_secret: SecretString::from(config.access_secret.expose_secret().to_owned()),
            refresh_secret: SecretString::from(config.refresh_secret.expose_secret().to_owned()),
        }
    }

    /// 액세스 토큰 검증.
    pub fn verify_access(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify(token, TokenClass::Access)
    }

    /// 리프레시 토큰 검증.
    pub fn verify_refresh(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify(token, TokenClass::Refresh)
    }

    fn verify(&self, token: &str, class: TokenClass) -> Result<Identity, AuthError> {
        let secret = match class {
            TokenClass::Access => &self.access_secret,
            TokenClass::Refresh => &self.refresh_secret,
        };

        let claims = self
            .codec
            .decode(token, secret.expose_secret().as_bytes())
            .map_err(|e| match e {
                JwtError::TokenExpired => AuthError::TokenExpired(class),
                JwtError::InvalidToken
                | JwtError::EncodingError(_)
                | JwtError::ExpiryOutOfRange => AuthError::TokenInvalid(class),
            })?;

        parse_identity(&claims, class)
    }
}

/// 클레임에서 식별 정보 추출.
///
/// `id`가 없거나 UUID가 아니면, 또는 `role`이 없거나 알 수 없는 값이면
/// 서명이 유효하더라도 `TokenInvalid`입니다.
pub fn parse_identity(claims: &ClaimsMap, class: TokenClass) -> Result<Identity, AuthError> {
    let id = claims
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AuthError::TokenInvalid(class))?;

    let role = claims
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .ok_or(AuthError::TokenInvalid(class))?;

    Ok(Identity::new(id, role))
}
