//! Authenticated actor and permission types.
//!
//! Authentication itself is an external collaborator: tokens are resolved to
//! an [`Actor`] by the `ActorResolver` port, and permission decisions come
//! from the `PermissionChecker` port. This module only defines the shapes
//! both sides agree on.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MemberKey, UserId};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Returns true for roles with administrative privileges.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Member => "Member",
            Role::Admin => "Admin",
            Role::SuperAdmin => "SuperAdmin",
        };
        write!(f, "{}", s)
    }
}

/// Permission strings gating engine entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    MemberView,
    MemberCreate,
    MemberEdit,
    MemberDelete,
    FamilyView,
}

impl Permission {
    /// The wire representation used by permission stores.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::MemberView => "member.view",
            Permission::MemberCreate => "member.create",
            Permission::MemberEdit => "member.edit",
            Permission::MemberDelete => "member.delete",
            Permission::FamilyView => "family.view",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated caller as seen by the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Account identity in the directory.
    pub user_id: UserId,

    /// Login name, used in logs only.
    pub username: String,

    /// Caller role.
    pub role: Role,

    /// Member record linked to this account, if any.
    pub member: Option<MemberKey>,
}

impl Actor {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            member: None,
        }
    }

    /// Attaches the linked member record.
    pub fn with_member(mut self, member: MemberKey) -> Self {
        self.member = Some(member);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new("u-1").unwrap(), "tester", role)
    }

    #[test]
    fn admin_roles_are_privileged() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::SuperAdmin.is_privileged());
        assert!(!Role::Member.is_privileged());
    }

    #[test]
    fn permission_strings_match_store_format() {
        assert_eq!(Permission::MemberView.as_str(), "member.view");
        assert_eq!(Permission::FamilyView.as_str(), "family.view");
    }

    #[test]
    fn actor_with_member_links_record() {
        let key = MemberKey::new();
        let a = actor(Role::Member).with_member(key);
        assert_eq!(a.member, Some(key));
    }
}
