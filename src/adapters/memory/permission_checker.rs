//! Role-based permission checker backed by a static policy table.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::domain::foundation::{Actor, DomainError, Permission, Role};
use crate::ports::PermissionChecker;

/// The default role policy.
///
/// Admin roles hold every permission; plain members can view, create, and
/// edit member records and view families, but never delete.
static DEFAULT_POLICY: Lazy<HashMap<Role, HashSet<&'static str>>> = Lazy::new(|| {
    let all: HashSet<&'static str> = [
        "member.view",
        "member.create",
        "member.edit",
        "member.delete",
        "family.view",
    ]
    .into_iter()
    .collect();

    let member: HashSet<&'static str> = [
        "member.view",
        "member.create",
        "member.edit",
        "family.view",
    ]
    .into_iter()
    .collect();

    HashMap::from([
        (Role::SuperAdmin, all.clone()),
        (Role::Admin, all),
        (Role::Member, member),
    ])
});

/// Permission checker driven by an in-process role policy table.
pub struct StaticPermissionChecker {
    policy: HashMap<Role, HashSet<&'static str>>,
}

impl StaticPermissionChecker {
    /// The default policy described on [`DEFAULT_POLICY`].
    pub fn default_policy() -> Self {
        Self {
            policy: DEFAULT_POLICY.clone(),
        }
    }

    /// A custom policy table.
    pub fn with_policy(policy: HashMap<Role, HashSet<&'static str>>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissionChecker {
    async fn is_allowed(
        &self,
        actor: &Actor,
        permission: Permission,
    ) -> Result<bool, DomainError> {
        Ok(self
            .policy
            .get(&actor.role)
            .is_some_and(|granted| granted.contains(permission.as_str())))
    }
}
