//! Marriage store port.
//!
//! The canonical record of spousal links. Implementations must enforce a
//! uniqueness constraint on the unordered (husband, wife) pair so concurrent
//! upserts of the same couple collapse into one record.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MarriageId, MemberKey};
use crate::domain::marriage::Marriage;

/// Repository port for Marriage record persistence.
#[async_trait]
pub trait MarriageStore: Send + Sync {
    /// Persist a new marriage.
    ///
    /// # Errors
    ///
    /// - `DuplicateMarriage` when a record for the pair already exists
    async fn insert(&self, marriage: &Marriage) -> Result<(), DomainError>;

    /// Update an existing marriage (status transitions).
    ///
    /// # Errors
    ///
    /// - `MarriageNotFound` if the record doesn't exist
    async fn update(&self, marriage: &Marriage) -> Result<(), DomainError>;

    /// Find a marriage by id.
    async fn find_by_id(&self, id: &MarriageId) -> Result<Option<Marriage>, DomainError>;

    /// The Active marriage involving a member, if any.
    async fn find_active_for(&self, key: &MemberKey) -> Result<Option<Marriage>, DomainError>;

    /// All Active marriages touching any of the given members.
    async fn find_active_touching(
        &self,
        keys: &[MemberKey],
    ) -> Result<Vec<Marriage>, DomainError>;

    /// The record for an unordered pair, regardless of status.
    async fn find_for_pair(
        &self,
        a: &MemberKey,
        b: &MemberKey,
    ) -> Result<Option<Marriage>, DomainError>;
}
