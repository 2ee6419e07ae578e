//! Sequential human-readable identifier allocation.
//!
//! Member and family identifiers are allocated by reading the highest
//! existing sequence and incrementing. Allocation is serialized behind an
//! async mutex so concurrent requests inside one process cannot read the same
//! high-water mark; across processes the store's unique index on the
//! identifier column turns the remaining race into a visible conflict.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, FamilyId, MemberId};
use crate::ports::MemberStore;

/// Allocator for `M####` member ids and `F####` family ids.
pub struct IdentifierGenerator {
    store: Arc<dyn MemberStore>,
    allocation: Mutex<()>,
}

impl IdentifierGenerator {
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self {
            store,
            allocation: Mutex::new(()),
        }
    }

    /// Next member identifier: `M0001` on an empty store, otherwise the
    /// numerically-next value after the highest allocated sequence.
    pub async fn next_member_id(&self) -> Result<MemberId, DomainError> {
        let _guard = self.allocation.lock().await;
        let next = self.store.max_member_sequence().await?.unwrap_or(0) + 1;
        Ok(MemberId::from_sequence(next))
    }

    /// Next family identifier, analogous to [`Self::next_member_id`].
    pub async fn next_family_id(&self) -> Result<FamilyId, DomainError> {
        let _guard = self.allocation.lock().await;
        let next = self.store.max_family_sequence().await?.unwrap_or(0) + 1;
        Ok(FamilyId::from_sequence(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberStore;
    use crate::domain::foundation::MemberKey;
    use crate::domain::member::{
        Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, Member, MemberProfile,
        PersonName,
    };
    use chrono::NaiveDate;

    fn member(seq: u32, family_seq: u32) -> Member {
        let profile = MemberProfile {
            name: PersonName::new(None, "Test", None, "Member").unwrap(),
            gender: Gender::Male,
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            marital_status: MaritalStatus::Single,
            life_status: LifeStatus::Alive,
            biodata: Biodata::default(),
            location: Location::default(),
            photo_url: None,
        };
        Member::create(
            MemberKey::new(),
            MemberId::from_sequence(seq),
            FamilyId::from_sequence(family_seq),
            profile,
            FamilyLinks::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_store_starts_the_sequences() {
        let store = Arc::new(InMemoryMemberStore::new());
        let gen = IdentifierGenerator::new(store);

        assert_eq!(gen.next_member_id().await.unwrap().as_str(), "M0001");
        assert_eq!(gen.next_family_id().await.unwrap().as_str(), "F0001");
    }

    #[tokio::test]
    async fn member_sequence_increments_past_existing() {
        let store = Arc::new(InMemoryMemberStore::new());
        for seq in 1..=9 {
            store.insert(&member(seq, 1)).await.unwrap();
        }
        let gen = IdentifierGenerator::new(store);

        assert_eq!(gen.next_member_id().await.unwrap().as_str(), "M0010");
    }

    #[tokio::test]
    async fn comparison_is_numeric_not_lexicographic() {
        let store = Arc::new(InMemoryMemberStore::new());
        store.insert(&member(9999, 1)).await.unwrap();
        store.insert(&member(10_000, 2)).await.unwrap();
        let gen = IdentifierGenerator::new(store);

        assert_eq!(gen.next_member_id().await.unwrap().as_str(), "M10001");
    }

    #[tokio::test]
    async fn family_sequence_ignores_sentinels() {
        let store = Arc::new(InMemoryMemberStore::new());
        let mut m = member(1, 7);
        m.assign_family(FamilyId::unassigned());
        store.insert(&m).await.unwrap();
        store.insert(&member(2, 3)).await.unwrap();
        let gen = IdentifierGenerator::new(store);

        assert_eq!(gen.next_family_id().await.unwrap().as_str(), "F0004");
    }
}
