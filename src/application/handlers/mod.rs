//! Application command and query handlers.

pub mod family;
pub mod member;
pub mod provisioning;

use crate::domain::foundation::MemberRef;
use crate::domain::member::{Member, MemberError};
use crate::ports::MemberStore;

/// Looks a member up by either reference form.
///
/// # Errors
///
/// - `NotFound` when no member matches the reference
pub(crate) async fn lookup_member(
    store: &dyn MemberStore,
    reference: &MemberRef,
) -> Result<Member, MemberError> {
    let found = match reference {
        MemberRef::Key(key) => store.find_by_key(key).await?,
        MemberRef::Public(id) => store.find_by_member_id(id).await?,
    };
    found.ok_or_else(|| MemberError::not_found(reference.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberStore;
    use crate::domain::foundation::{FamilyId, MemberId, MemberKey};
    use crate::domain::member::{
        Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, MemberProfile,
        PersonName,
    };
    use chrono::NaiveDate;

    fn seeded() -> (InMemoryMemberStore, Member) {
        let profile = MemberProfile {
            name: PersonName::new(None, "Ram", None, "Patil").unwrap(),
            gender: Gender::Male,
            dob: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            marital_status: MaritalStatus::Single,
            life_status: LifeStatus::Alive,
            biodata: Biodata::default(),
            location: Location::default(),
            photo_url: None,
        };
        let member = Member::create(
            MemberKey::new(),
            MemberId::from_sequence(7),
            FamilyId::unassigned(),
            profile,
            FamilyLinks::default(),
        )
        .unwrap();
        (InMemoryMemberStore::new(), member)
    }

    #[tokio::test]
    async fn lookup_finds_by_key_and_public_id() {
        let (store, member) = seeded();
        store.insert(&member).await.unwrap();

        let by_key = lookup_member(&store, &MemberRef::Key(*member.key())).await.unwrap();
        assert_eq!(by_key.key(), member.key());

        let by_id = lookup_member(&store, &MemberRef::Public(member.member_id().clone()))
            .await
            .unwrap();
        assert_eq!(by_id.key(), member.key());
    }

    #[tokio::test]
    async fn lookup_reports_not_found() {
        let (store, member) = seeded();
        let result = lookup_member(&store, &MemberRef::Key(*member.key())).await;
        assert!(matches!(result, Err(MemberError::NotFound(_))));
    }
}
