//! Account auto-provisioning after member creation.
//!
//! Provisioning is best-effort from the member engine's point of view: a
//! failure here is reported to the caller and logged, but never rolls back
//! the member write.

use std::sync::Arc;

use crate::domain::foundation::{Actor, DomainError, Role};
use crate::domain::member::Member;
use crate::ports::{Account, AccountDirectory, NewAccount};

/// Fixed provisioning policy knobs, injected from configuration.
#[derive(Debug, Clone)]
pub struct ProvisioningDefaults {
    /// Initial password for admin-provisioned accounts, and the fallback for
    /// pending accounts without a phone number.
    pub default_password: String,
}

/// What happened to the side operations of a member creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    /// An account was created for the new member.
    Provisioned { username: String, verified: bool },
    /// Account creation failed; the member itself was still saved.
    Failed { reason: String },
}

/// Provisions login accounts for freshly created members.
pub struct AccountProvisioner {
    directory: Arc<dyn AccountDirectory>,
    defaults: ProvisioningDefaults,
}

impl AccountProvisioner {
    pub fn new(directory: Arc<dyn AccountDirectory>, defaults: ProvisioningDefaults) -> Self {
        Self { directory, defaults }
    }

    /// Provisions an account for the member.
    ///
    /// A privileged actor yields a verified account with a name-derived
    /// username; anyone else yields a pending account keyed by the member id,
    /// left for an administrator to approve.
    pub async fn provision(&self, member: &Member, actor: &Actor) -> Result<Account, DomainError> {
        if actor.role.is_privileged() {
            let username = self.unique_username(member).await?;
            self.directory
                .create(NewAccount {
                    username,
                    password: self.defaults.default_password.clone(),
                    display_name: member.full_name().to_string(),
                    role: Role::Member,
                    verified: true,
                    member: Some(*member.key()),
                    permissions: vec!["member.view".to_string(), "member.edit".to_string()],
                })
                .await
        } else {
            let password = member
                .profile()
                .biodata
                .phone
                .clone()
                .unwrap_or_else(|| self.defaults.default_password.clone());
            self.directory
                .create(NewAccount {
                    username: member.member_id().as_str().to_string(),
                    password,
                    display_name: member.full_name().to_string(),
                    role: Role::Member,
                    verified: false,
                    member: Some(*member.key()),
                    permissions: Vec::new(),
                })
                .await
        }
    }

    /// Links the caller's own account to the member when the account has no
    /// linked member yet. Returns true when a link was written.
    pub async fn link_caller(&self, actor: &Actor, member: &Member) -> Result<bool, DomainError> {
        match self.directory.find(&actor.user_id).await? {
            Some(account) if account.member.is_none() => {
                self.directory
                    .link_member(&actor.user_id, member.key())
                    .await?;
                tracing::info!(
                    user = %actor.user_id,
                    member = %member.member_id(),
                    "linked caller account to new member"
                );
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn unique_username(&self, member: &Member) -> Result<String, DomainError> {
        let base = format!(
            "{}{}",
            slug(member.name().first()),
            slug(member.name().last())
        );
        let base = if base.is_empty() {
            format!("user{}", member.member_id().as_str().to_lowercase())
        } else {
            base
        };

        let mut username = base.clone();
        let mut counter = 1;
        while self.directory.username_taken(&username).await? {
            username = format!("{}{}", base, counter);
            counter += 1;
        }
        Ok(username)
    }
}

/// Lowercased ASCII-alphanumeric form of a name component.
fn slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
