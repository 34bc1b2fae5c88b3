//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 정의. 역할은 닫힌 집합이며 토큰 클레임에는 소문자 문자열로 기록됩니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 사용자 관리 등 특권 작업 가능
    Admin,
    /// 일반 사용자
    User,
}

impl Role {
    /// 클레임에 기록되는 문자열 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// 클레임 문자열에서 역할 파싱.
    ///
    /// 발급 시 사용한 값과 정확히 일치해야 합니다. 대소문자를 바꾼 값이나
    /// 알 수 없는 값은 `None`입니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("ADMIN"), None);
        assert_eq!(Role::parse("notarole"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_parse_matches_display() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);

        assert!(serde_json::from_str::<Role>("\"viewer\"").is_err());
    }
}
