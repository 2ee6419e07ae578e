//! Permission checker port.
//!
//! Authorization is an external collaborator: the engine only asks whether an
//! actor holds a permission string and refuses to act when the answer is no.

use async_trait::async_trait;

use crate::domain::foundation::{Actor, DomainError, ErrorCode, Permission};

/// Port for permission decisions keyed by actor role and permission string.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// True when the actor holds the permission.
    async fn is_allowed(&self, actor: &Actor, permission: Permission)
        -> Result<bool, DomainError>;

    /// Precondition gate: `Forbidden` unless the actor holds the permission.
    async fn require(&self, actor: &Actor, permission: Permission) -> Result<(), DomainError> {
        if self.is_allowed(actor, permission).await? {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Missing permission '{}'", permission),
            )
            .with_detail("permission", permission.as_str())
            .with_detail("role", actor.role.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, UserId};

    struct DenyAll;

    #[async_trait]
    impl PermissionChecker for DenyAll {
        async fn is_allowed(
            &self,
            _actor: &Actor,
            _permission: Permission,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn require_maps_denial_to_forbidden() {
        let actor = Actor::new(UserId::new("u-1").unwrap(), "tester", Role::Member);
        let err = DenyAll
            .require(&actor, Permission::MemberCreate)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(
            err.details.get("permission"),
            Some(&"member.create".to_string())
        );
    }
}
