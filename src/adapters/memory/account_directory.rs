//! In-memory implementation of AccountDirectory.
//!
//! Stores plain passwords in memory; strictly a stand-in for the real
//! identity system during tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MemberKey, UserId};
use crate::ports::{Account, AccountDirectory, NewAccount};

struct StoredAccount {
    account: Account,
    #[allow(dead_code)]
    password: String,
}

/// In-memory account directory.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned.
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<String, StoredAccount>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Re-keys the account with the given username under a specific user id
    /// (test helper for simulating externally-issued identities).
    pub fn adopt_id(&self, user_id: &UserId, username: &str) {
        let mut accounts = self
            .accounts
            .write()
            .expect("InMemoryAccountDirectory: lock poisoned");
        let old_key = accounts
            .iter()
            .find(|(_, stored)| stored.account.username == username)
            .map(|(key, _)| key.clone());
        if let Some(old_key) = old_key {
            if let Some(mut stored) = accounts.remove(&old_key) {
                stored.account.id = user_id.clone();
                accounts.insert(user_id.as_str().to_string(), stored);
            }
        }
    }

    /// Number of stored accounts (test helper).
    pub fn len(&self) -> usize {
        self.accounts
            .read()
            .expect("InMemoryAccountDirectory: lock poisoned")
            .len()
    }

    /// True when no accounts are stored (test helper).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn username_taken(&self, username: &str) -> Result<bool, DomainError> {
        let accounts = self
            .accounts
            .read()
            .expect("InMemoryAccountDirectory: lock poisoned");
        Ok(accounts
            .values()
            .any(|stored| stored.account.username == username))
    }

    async fn create(&self, new_account: NewAccount) -> Result<Account, DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .expect("InMemoryAccountDirectory: lock poisoned");
        if accounts
            .values()
            .any(|stored| stored.account.username == new_account.username)
        {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Username already taken: {}", new_account.username),
            ));
        }

        let id = UserId::new(format!("acct-{}", new_account.username))
            .map_err(DomainError::from)?;
        let account = Account {
            id: id.clone(),
            username: new_account.username,
            display_name: new_account.display_name,
            role: new_account.role,
            verified: new_account.verified,
            member: new_account.member,
        };
        accounts.insert(
            id.as_str().to_string(),
            StoredAccount {
                account: account.clone(),
                password: new_account.password,
            },
        );
        Ok(account)
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<Account>, DomainError> {
        let accounts = self
            .accounts
            .read()
            .expect("InMemoryAccountDirectory: lock poisoned");
        Ok(accounts.get(user_id.as_str()).map(|s| s.account.clone()))
    }

    async fn link_member(
        &self,
        user_id: &UserId,
        member: &MemberKey,
    ) -> Result<(), DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .expect("InMemoryAccountDirectory: lock poisoned");
        let stored = accounts.get_mut(user_id.as_str()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", user_id),
            )
        })?;
        stored.account.member = Some(*member);
        Ok(())
    }
}
