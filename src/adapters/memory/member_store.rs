//! In-memory implementation of MemberStore.
//!
//! Backs unit and integration tests, and the `memory` store backend for
//! local development. Not intended for production data.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, FamilyId, MemberId, MemberKey};
use crate::domain::member::{Gender, MaritalStatus, Member};
use crate::ports::{MemberCounts, MemberStore};

/// In-memory member store.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned. Acceptable for test
/// and development use, which is all this adapter is for.
pub struct InMemoryMemberStore {
    records: RwLock<HashMap<MemberKey, Member>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<MemberKey, Member>> {
        self.records
            .read()
            .expect("InMemoryMemberStore: lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<MemberKey, Member>> {
        self.records
            .write()
            .expect("InMemoryMemberStore: lock poisoned")
    }

    /// Number of stored members (test helper).
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when the store holds no members (test helper).
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for InMemoryMemberStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn insert(&self, member: &Member) -> Result<(), DomainError> {
        let mut records = self.write();
        if records.contains_key(member.key()) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Member already exists: {}", member.key()),
            ));
        }
        if records
            .values()
            .any(|m| m.member_id() == member.member_id())
        {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Duplicate member id: {}", member.member_id()),
            ));
        }
        records.insert(*member.key(), member.clone());
        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), DomainError> {
        let mut records = self.write();
        if !records.contains_key(member.key()) {
            return Err(DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", member.key()),
            ));
        }
        records.insert(*member.key(), member.clone());
        Ok(())
    }

    async fn delete(&self, key: &MemberKey) -> Result<(), DomainError> {
        let mut records = self.write();
        if records.remove(key).is_none() {
            return Err(DomainError::new(
                ErrorCode::MemberNotFound,
                format!("Member not found: {}", key),
            ));
        }
        Ok(())
    }

    async fn find_by_key(&self, key: &MemberKey) -> Result<Option<Member>, DomainError> {
        Ok(self.read().get(key).cloned())
    }

    async fn find_by_member_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        Ok(self
            .read()
            .values()
            .find(|m| m.member_id() == id)
            .cloned())
    }

    async fn find_by_keys(&self, keys: &[MemberKey]) -> Result<Vec<Member>, DomainError> {
        let records = self.read();
        Ok(keys.iter().filter_map(|k| records.get(k).cloned()).collect())
    }

    async fn find_by_family(&self, family_id: &FamilyId) -> Result<Vec<Member>, DomainError> {
        Ok(self
            .read()
            .values()
            .filter(|m| m.family_id() == family_id)
            .cloned()
            .collect())
    }

    async fn find_children_of(&self, parents: &[MemberKey]) -> Result<Vec<Member>, DomainError> {
        let parents: HashSet<&MemberKey> = parents.iter().collect();
        Ok(self
            .read()
            .values()
            .filter(|m| {
                m.father().is_some_and(|f| parents.contains(f))
                    || m.mother().is_some_and(|p| parents.contains(p))
            })
            .cloned()
            .collect())
    }

    async fn find_child_named(
        &self,
        first: &str,
        last: &str,
        father: Option<&MemberKey>,
        mother: Option<&MemberKey>,
    ) -> Result<Option<Member>, DomainError> {
        Ok(self
            .read()
            .values()
            .find(|m| {
                let name_matches = m.name().first().eq_ignore_ascii_case(first)
                    && m.name().last().eq_ignore_ascii_case(last);
                let parent_matches = (father.is_some() && m.father() == father)
                    || (mother.is_some() && m.mother() == mother);
                name_matches && parent_matches
            })
            .cloned())
    }

    async fn count_in_family(&self, family_id: &FamilyId) -> Result<u64, DomainError> {
        Ok(self
            .read()
            .values()
            .filter(|m| m.family_id() == family_id)
            .count() as u64)
    }

    async fn max_member_sequence(&self) -> Result<Option<u32>, DomainError> {
        Ok(self.read().values().map(|m| m.member_id().sequence()).max())
    }

    async fn max_family_sequence(&self) -> Result<Option<u32>, DomainError> {
        Ok(self
            .read()
            .values()
            .filter_map(|m| m.family_id().sequence())
            .max())
    }

    async fn member_counts(&self) -> Result<MemberCounts, DomainError> {
        let records = self.read();
        let mut counts = MemberCounts::default();
        let mut families: HashSet<&str> = HashSet::new();
        for member in records.values() {
            counts.total += 1;
            match member.gender() {
                Gender::Male => counts.male += 1,
                Gender::Female => counts.female += 1,
            }
            match (member.gender(), member.marital_status()) {
                (_, MaritalStatus::Married) => counts.married += 1,
                (Gender::Male, MaritalStatus::Single) => counts.single_male += 1,
                (Gender::Female, MaritalStatus::Single) => counts.single_female += 1,
                _ => {}
            }
            if member.is_primary() {
                counts.primary += 1;
            }
            if member.family_id().is_assigned() {
                families.insert(member.family_id().as_str());
            }
        }
        counts.families = families.len() as u64;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{
        Biodata, FamilyLinks, LifeStatus, Location, MemberProfile, PersonName,
    };
    use chrono::NaiveDate;

    fn member(seq: u32, first: &str, links: FamilyLinks) -> Member {
        let profile = MemberProfile {
            name: PersonName::new(None, first, None, "Patil").unwrap(),
            gender: Gender::Male,
            dob: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            marital_status: MaritalStatus::Single,
            life_status: LifeStatus::Alive,
            biodata: Biodata::default(),
            location: Location::default(),
            photo_url: None,
        };
        Member::create(
            MemberKey::new(),
            MemberId::from_sequence(seq),
            FamilyId::from_sequence(1),
            profile,
            FamilyLinks::default(),
        )
        .map(|mut m| {
            m.set_parents(links.father, links.mother).unwrap();
            m
        })
        .unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_member_id() {
        let store = InMemoryMemberStore::new();
        store.insert(&member(1, "Ram", FamilyLinks::default())).await.unwrap();
        let result = store.insert(&member(1, "Shyam", FamilyLinks::default())).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::Conflict));
    }

    #[tokio::test]
    async fn update_of_missing_member_fails() {
        let store = InMemoryMemberStore::new();
        let result = store.update(&member(1, "Ram", FamilyLinks::default())).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::MemberNotFound));
    }

    #[tokio::test]
    async fn find_children_matches_either_parent() {
        let store = InMemoryMemberStore::new();
        let dad = member(1, "Dad", FamilyLinks::default());
        store.insert(&dad).await.unwrap();
        let child = member(
            2,
            "Kid",
            FamilyLinks {
                father: Some(*dad.key()),
                mother: None,
                spouse: None,
            },
        );
        store.insert(&child).await.unwrap();

        let children = store.find_children_of(&[*dad.key()]).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].key(), child.key());
    }

    #[tokio::test]
    async fn find_child_named_is_case_insensitive() {
        let store = InMemoryMemberStore::new();
        let dad = member(1, "Dad", FamilyLinks::default());
        store.insert(&dad).await.unwrap();
        let child = member(
            2,
            "Arjun",
            FamilyLinks {
                father: Some(*dad.key()),
                mother: None,
                spouse: None,
            },
        );
        store.insert(&child).await.unwrap();

        let found = store
            .find_child_named("ARJUN", "patil", Some(dad.key()), None)
            .await
            .unwrap();
        assert!(found.is_some());

        let not_found = store
            .find_child_named("Arjun", "Patil", Some(&MemberKey::new()), None)
            .await
            .unwrap();
        assert!(not_found.is_none());
    }
}
