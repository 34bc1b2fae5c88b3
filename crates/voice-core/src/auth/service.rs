//! 토큰 쌍 발급.
//!
//! 하나의 [`Identity`]로 액세스 토큰과 리프레시 토큰을 함께 발급합니다.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codec::{ClaimsMap, JwtError, TokenCodec};
use super::Identity;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// 토큰 타입 표기 (항상 "bearer").
pub const TOKEN_TYPE: &str = "bearer";

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// 토큰 타입 (항상 "bearer")
    pub token_type: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
}

/// 식별 정보를 클레임 맵으로 변환.
///
/// 페이로드 스키마는 두 토큰 종류가 같으며 `{id, role}`만 담습니다.
pub fn identity_claims(identity: &Identity) -> ClaimsMap {
    let mut claims = ClaimsMap::new();
    claims.insert("id".to_string(), Value::from(identity.id.to_string()));
    claims.insert("role".to_string(), Value::from(identity.role.as_str()));
    claims
}

/// 토큰 발급 서비스.
///
/// 두 비밀 키는 생성 시 설정에서 복사되어 이후 변경되지 않습니다.
pub struct TokenService {
    codec: TokenCodec,
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.codec.algorithm())
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// 설정에서 토큰 발급 서비스 생성.
    ///
    /// 만료 시간이 `Duration` 범위를 넘으면 최댓값으로 고정되며, 발급 시
    /// `AuthError::TokenEncoding`으로 거부됩니다.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            codec: TokenCodec::new(config.algorithm),
            access_secret: SecretString::from(config.access_secret.expose_secret().to_owned()),
            refresh_secret: SecretString::from(config.refresh_secret.expose_secret().to_owned()),
            access_ttl: Duration::try_minutes(config.access_ttl_minutes).unwrap_or(Duration::MAX),
            refresh_ttl: Duration::try_days(config.refresh_ttl_days).unwrap_or(Duration::MAX),
        }
    }

    /// Access Token + Refresh Token 쌍 생성.
    ///
    /// 액세스 토큰은 액세스 키와 짧은 만료 시간으로, 리프레시 토큰은 리프레시
    /// 키와 긴 만료 시간으로 서명합니다.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let claims = identity_claims(identity);

        let access_token = self
            .codec
            .encode(&claims, self.access_secret.expose_secret().as_bytes(), self.access_ttl)
            .map_err(encoding_error)?;
        let refresh_token = self
            .codec
            .encode(&claims, self.refresh_secret.expose_secret().as_bytes(), self.refresh_ttl)
            .map_err(encoding_error)?;

        tracing::debug!(user_id = %identity.id, role = %identity.role, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }
}

fn encoding_error(e: JwtError) -> AuthError {
    tracing::error!(error = %e, "Failed to sign token");
    AuthError::TokenEncoding(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use serde_json::json;
    use uuid::Uuid;

    const ACCESS: &str = "access-secret-key-for-testing-minimum-32-chars";
    const REFRESH: &str = "refresh-secret-key-for-testing-minimum-32-chars";

    #[test]
    fn test_identity_claims() {
        let identity = Identity::new(Uuid::new_v4(), Role::User);
        let claims = identity_claims(&identity);

        assert_eq!(claims.len(), 2);
        assert_eq!(claims["id"], json!(identity.id.to_string()));
        assert_eq!(claims["role"], json!("user"));
    }

    #[test]
    fn test_issue_token_pair() {
        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH).with_ttl(30, 7));
        let identity = Identity::new(Uuid::new_v4(), Role::Admin);

        let pair = service.issue(&identity).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.token_type, "bearer");
        assert_eq!(pair.expires_in, 30 * 60);
    }

    #[test]
    fn test_issue_with_out_of_range_ttl_fails() {
        let identity = Identity::new(Uuid::new_v4(), Role::User);

        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH).with_ttl(30, 100_000_000));
        assert!(matches!(
            service.issue(&identity),
            Err(AuthError::TokenEncoding(_))
        ));

        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH).with_ttl(i64::MAX, 7));
        assert!(matches!(
            service.issue(&identity),
            Err(AuthError::TokenEncoding(_))
        ));
    }

    #[test]
    fn test_each_token_signed_with_its_own_secret() {
        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH));
        let identity = Identity::new(Uuid::new_v4(), Role::User);
        let pair = service.issue(&identity).unwrap();
        let codec = TokenCodec::default();

        assert!(codec.decode(&pair.access_token, ACCESS.as_bytes()).is_ok());
        assert!(codec.decode(&pair.access_token, REFRESH.as_bytes()).is_err());
        assert!(codec.decode(&pair.refresh_token, REFRESH.as_bytes()).is_ok());
        assert!(codec.decode(&pair.refresh_token, ACCESS.as_bytes()).is_err());
    }

    #[test]
    fn test_payload_has_exactly_id_role_exp() {
        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH).with_ttl(10, 3));
        let identity = Identity::new(Uuid::new_v4(), Role::User);
        let pair = service.issue(&identity).unwrap();
        let codec = TokenCodec::default();

        let access = codec.decode(&pair.access_token, ACCESS.as_bytes()).unwrap();
        let refresh = codec.decode(&pair.refresh_token, REFRESH.as_bytes()).unwrap();

        let mut keys: Vec<&str> = access.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["exp", "id", "role"]);

        // 리프레시 토큰이 훨씬 늦게 만료됨
        let access_exp = access["exp"].as_i64().unwrap();
        let refresh_exp = refresh["exp"].as_i64().unwrap();
        assert!(refresh_exp - access_exp > Duration::days(2).num_seconds());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH));
        let debug = format!("{:?}", service);
        assert!(!debug.contains(ACCESS));
        assert!(!debug.contains(REFRESH));
    }
}
