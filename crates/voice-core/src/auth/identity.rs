//! 토큰에 담기는 사용자 식별 정보.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// 검증된 사용자 식별 정보.
///
/// 토큰 페이로드에 실리는 유일한 정보입니다. 검증할 때마다 클레임에서 새로
/// 만들어지며 어디에도 저장되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Identity {
    /// 사용자 ID
    pub id: Uuid,
    /// 사용자 역할
    pub role: Role,
}

impl Identity {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}
