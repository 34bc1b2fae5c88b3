//! 인증/인가 에러 타입.
//!
//! 모든 에러는 현재 요청에 대해 최종적입니다. 내부 재시도는 없으며,
//! 검증 실패는 분류되어 호출자에게 그대로 전달됩니다.

use thiserror::Error;

/// 토큰 종류.
///
/// 두 종류는 서명에 사용한 비밀 키와 만료 시간으로만 구분됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// 일반 API 호출용 단기 토큰
    Access,
    /// 토큰 쌍 재발급용 장기 토큰
    Refresh,
}

impl TokenClass {
    /// 에러 메시지에 사용되는 이름.
    pub fn label(&self) -> &'static str {
        match self {
            TokenClass::Access => "액세스 토큰",
            TokenClass::Refresh => "리프레시 토큰",
        }
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 인증/인가 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 로그인 시 사용자 이름 또는 비밀번호 불일치
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 서명은 유효하지만 만료된 토큰
    #[error("{0}이 만료되었습니다")]
    TokenExpired(TokenClass),

    /// 서명 불일치, 잘못된 비밀 키, 잘못된 클레임, 파싱 불가 구조
    #[error("유효하지 않은 {0}입니다")]
    TokenInvalid(TokenClass),

    /// 유효한 사용자지만 역할이 부족함
    #[error("권한이 부족합니다")]
    Forbidden,

    /// 토큰 서명 실패
    #[error("토큰 인코딩 실패: {0}")]
    TokenEncoding(String),
}

/// 인증 작업을 위한 Result 타입.
pub type AuthResult<T> = Result<T, AuthError>;
