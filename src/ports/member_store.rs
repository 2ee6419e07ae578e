//! Member store port.
//!
//! Defines the contract for persisting and querying Member aggregates.
//! Implementations must index the foreign-key fields (`family_id`, `father`,
//! `mother`); the relationship resolver issues multi-key lookups against
//! them on every request.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, FamilyId, MemberId, MemberKey};
use crate::domain::member::Member;

/// Aggregate member counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberCounts {
    pub total: u64,
    pub male: u64,
    pub female: u64,
    pub married: u64,
    pub single_male: u64,
    pub single_female: u64,
    pub primary: u64,
    pub families: u64,
}

/// Repository port for Member aggregate persistence.
///
/// Implementations must enforce a uniqueness constraint on `member_id`;
/// identifier allocation relies on it to surface races as conflicts instead
/// of silent duplicates.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Persist a new member.
    ///
    /// # Errors
    ///
    /// - `Conflict` on a duplicate `member_id`
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, member: &Member) -> Result<(), DomainError>;

    /// Update an existing member.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    async fn update(&self, member: &Member) -> Result<(), DomainError>;

    /// Delete a member by key.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    async fn delete(&self, key: &MemberKey) -> Result<(), DomainError>;

    /// Find a member by internal key. Returns `None` if not found.
    async fn find_by_key(&self, key: &MemberKey) -> Result<Option<Member>, DomainError>;

    /// Find a member by public `M####` identifier.
    async fn find_by_member_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    /// Fetch all members for a set of keys. Missing keys are skipped.
    async fn find_by_keys(&self, keys: &[MemberKey]) -> Result<Vec<Member>, DomainError>;

    /// All members of a household.
    async fn find_by_family(&self, family_id: &FamilyId) -> Result<Vec<Member>, DomainError>;

    /// All members whose father or mother is one of the given keys.
    async fn find_children_of(&self, parents: &[MemberKey]) -> Result<Vec<Member>, DomainError>;

    /// Looks for an existing child with this name under either parent.
    ///
    /// Name matching is case-insensitive; used by the duplicate-child guard.
    async fn find_child_named(
        &self,
        first: &str,
        last: &str,
        father: Option<&MemberKey>,
        mother: Option<&MemberKey>,
    ) -> Result<Option<Member>, DomainError>;

    /// Number of members currently assigned to a household.
    async fn count_in_family(&self, family_id: &FamilyId) -> Result<u64, DomainError>;

    /// Highest allocated member sequence, or `None` on an empty store.
    async fn max_member_sequence(&self) -> Result<Option<u32>, DomainError>;

    /// Highest allocated family sequence, or `None` when no household exists.
    async fn max_family_sequence(&self) -> Result<Option<u32>, DomainError>;

    /// Aggregate counts for the dashboard.
    async fn member_counts(&self) -> Result<MemberCounts, DomainError>;
}
