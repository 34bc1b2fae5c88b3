//! JWT 토큰 인코딩/디코딩.
//!
//! 클레임 맵, 비밀 키, 만료 시간, 알고리즘만 다루는 범용 서명 토큰 기본 연산.
//! 토큰 종류(액세스/리프레시)는 이 계층에서 알지 못합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};

/// 토큰 페이로드의 클레임 맵.
pub type ClaimsMap = Map<String, Value>;

/// 만료 시간 클레임 이름.
pub const EXP_CLAIM: &str = "exp";

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰")]
    InvalidToken,
    #[error("만료 시간이 표현 가능한 범위를 벗어났습니다")]
    ExpiryOutOfRange,
}

/// 서명 토큰 코덱.
///
/// 하나의 서명 알고리즘으로 고정되며, 디코딩 시 헤더의 알고리즘이 다르면 거부합니다.
#[derive(Debug, Clone, Copy)]
pub struct TokenCodec {
    algorithm: Algorithm,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(Algorithm::HS256)
    }
}

impl TokenCodec {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// 설정된 서명 알고리즘.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 토큰 생성.
    ///
    /// 클레임을 복사한 뒤 `exp = now + ttl`을 넣고 서명합니다. 호출자가 넘긴
    /// `exp`는 덮어씁니다. `ttl`이 음수이면 이미 만료된 토큰이 만들어집니다.
    /// `now + ttl`이 날짜 범위를 넘으면 `ExpiryOutOfRange`를 반환합니다.
    ///
    /// # Arguments
    ///
    /// * `claims` - 페이로드 클레임
    /// * `secret` - 서명 키
    /// * `ttl` - 만료까지 남은 시간
    ///
    /// # Returns
    ///
    /// `header.payload.signature` 형식의 토큰 문자열
    pub fn encode(
        &self,
        claims: &ClaimsMap,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let mut payload = claims.clone();
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(JwtError::ExpiryOutOfRange)?
            .timestamp();
        payload.insert(EXP_CLAIM.to_string(), Value::from(exp));

        encode(
            &Header::new(self.algorithm),
            &payload,
            &EncodingKey::from_secret(secret),
        )
        .map_err(JwtError::from)
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// 서명과 알고리즘을 먼저 확인하고 그다음 만료 시간을 확인합니다.
    /// 서명이 유효하고 `exp`가 지났을 때만 `TokenExpired`이며,
    /// 그 밖의 모든 실패는 `InvalidToken`으로 합쳐집니다.
    pub fn decode(&self, token: &str, secret: &[u8]) -> Result<ClaimsMap, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<ClaimsMap>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                kind => {
                    tracing::debug!(error = ?kind, "Token rejected");
                    JwtError::InvalidToken
                }
            })?;

        // 라이브러리는 exp < now만 만료로 보므로 exp == now도 여기서 만료 처리
        let exp = data
            .claims
            .get(EXP_CLAIM)
            .and_then(Value::as_i64)
            .ok_or(JwtError::InvalidToken)?;
        if Utc::now().timestamp() >= exp {
            return Err(JwtError::TokenExpired);
        }

        Ok(data.claims)
    }
}
