//! 역할 검사.

use super::{Identity, Role};
use crate::error::AuthError;

/// 특정 역할을 요구합니다.
///
/// 역할 간 상하 관계는 없으며 정확히 일치해야 통과합니다.
///
/// # Returns
///
/// 역할이 일치하면 Ok(()), 아니면 `AuthError::Forbidden`
pub fn require_role(identity: &Identity, required: Role) -> Result<(), AuthError> {
    match (identity.role, required) {
        (Role::Admin, Role::Admin) | (Role::User, Role::User) => Ok(()),
        (Role::Admin, Role::User) | (Role::User, Role::Admin) => {
            tracing::debug!(
                user_id = %identity.id,
                role = %identity.role,
                required = %required,
                "Role check failed"
            );
            Err(AuthError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_require_role() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);
        let user = Identity::new(Uuid::new_v4(), Role::User);

        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(require_role(&user, Role::User).is_ok());

        assert_eq!(require_role(&user, Role::Admin), Err(AuthError::Forbidden));
        assert_eq!(require_role(&admin, Role::User), Err(AuthError::Forbidden));
    }
}
