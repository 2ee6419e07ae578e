//! In-memory implementation of MarriageStore.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MarriageId, MemberKey};
use crate::domain::marriage::Marriage;
use crate::ports::MarriageStore;

/// In-memory marriage store.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned. Test and development
/// use only.
pub struct InMemoryMarriageStore {
    records: RwLock<HashMap<MarriageId, Marriage>>,
}

impl InMemoryMarriageStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<MarriageId, Marriage>> {
        self.records
            .read()
            .expect("InMemoryMarriageStore: lock poisoned")
    }

    /// Number of stored records (test helper).
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no records are stored (test helper).
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for InMemoryMarriageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarriageStore for InMemoryMarriageStore {
    async fn insert(&self, marriage: &Marriage) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryMarriageStore: lock poisoned");
        // Mirror the unordered-pair uniqueness constraint of the schema.
        if records
            .values()
            .any(|m| m.links(marriage.husband(), marriage.wife()))
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateMarriage,
                "A marriage record for this pair already exists",
            ));
        }
        records.insert(*marriage.id(), marriage.clone());
        Ok(())
    }

    async fn update(&self, marriage: &Marriage) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryMarriageStore: lock poisoned");
        if !records.contains_key(marriage.id()) {
            return Err(DomainError::new(
                ErrorCode::MarriageNotFound,
                format!("Marriage not found: {}", marriage.id()),
            ));
        }
        records.insert(*marriage.id(), marriage.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MarriageId) -> Result<Option<Marriage>, DomainError> {
        Ok(self.read().get(id).cloned())
    }

    async fn find_active_for(&self, key: &MemberKey) -> Result<Option<Marriage>, DomainError> {
        Ok(self
            .read()
            .values()
            .find(|m| m.is_active() && m.involves(key))
            .cloned())
    }

    async fn find_active_touching(
        &self,
        keys: &[MemberKey],
    ) -> Result<Vec<Marriage>, DomainError> {
        Ok(self
            .read()
            .values()
            .filter(|m| m.is_active() && keys.iter().any(|k| m.involves(k)))
            .cloned()
            .collect())
    }

    async fn find_for_pair(
        &self,
        a: &MemberKey,
        b: &MemberKey,
    ) -> Result<Option<Marriage>, DomainError> {
        Ok(self.read().values().find(|m| m.links(a, b)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{FamilyId, MemberId};
    use crate::domain::member::{
        Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, Member, MemberProfile,
        PersonName,
    };
    use crate::domain::marriage::MarriageStatus;
    use chrono::NaiveDate;

    fn person(first: &str, gender: Gender) -> Member {
        let profile = MemberProfile {
            name: PersonName::new(None, first, None, "Patil").unwrap(),
            gender,
            dob: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            marital_status: MaritalStatus::Married,
            life_status: LifeStatus::Alive,
            biodata: Biodata::default(),
            location: Location::default(),
            photo_url: None,
        };
        Member::create(
            MemberKey::new(),
            MemberId::from_sequence(1),
            FamilyId::from_sequence(1),
            profile,
            FamilyLinks::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_pair_either_order() {
        let store = InMemoryMarriageStore::new();
        let h = person("Ram", Gender::Male);
        let w = person("Sita", Gender::Female);

        let first = Marriage::between(MarriageId::new(), &h, &w).unwrap();
        store.insert(&first).await.unwrap();

        let second = Marriage::between(MarriageId::new(), &w, &h).unwrap();
        let result = store.insert(&second).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::DuplicateMarriage));
    }

    #[tokio::test]
    async fn active_queries_skip_dissolved_records() {
        let store = InMemoryMarriageStore::new();
        let h = person("Ram", Gender::Male);
        let w = person("Sita", Gender::Female);

        let mut marriage = Marriage::between(MarriageId::new(), &h, &w).unwrap();
        store.insert(&marriage).await.unwrap();
        marriage.dissolve(MarriageStatus::Divorced).unwrap();
        store.update(&marriage).await.unwrap();

        assert!(store.find_active_for(h.key()).await.unwrap().is_none());
        assert!(store
            .find_active_touching(&[*h.key(), *w.key()])
            .await
            .unwrap()
            .is_empty());
        // The pair lookup still sees the dissolved record.
        assert!(store.find_for_pair(h.key(), w.key()).await.unwrap().is_some());
    }
}
