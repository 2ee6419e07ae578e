//! Account directory port.
//!
//! Login accounts are owned by an external identity system; the engine only
//! provisions them after member creation and links unlinked caller accounts.
//! Password handling (hashing, policy) belongs entirely to the adapter.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberKey, Role, UserId};

/// A login account as visible to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub verified: bool,
    pub member: Option<MemberKey>,
}

/// Payload for provisioning a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    /// Plain initial password; the adapter hashes it.
    pub password: String,
    pub display_name: String,
    pub role: Role,
    /// Verified accounts can log in immediately; unverified ones wait for
    /// administrator approval.
    pub verified: bool,
    pub member: Option<MemberKey>,
    pub permissions: Vec<String>,
}

/// Directory port for login account provisioning and linking.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// True when the username is already taken.
    async fn username_taken(&self, username: &str) -> Result<bool, DomainError>;

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// - `Conflict` on a duplicate username
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError>;

    /// Find an account by its id.
    async fn find(&self, user_id: &UserId) -> Result<Option<Account>, DomainError>;

    /// Link an account to a member record.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    async fn link_member(
        &self,
        user_id: &UserId,
        member: &MemberKey,
    ) -> Result<(), DomainError>;
}
