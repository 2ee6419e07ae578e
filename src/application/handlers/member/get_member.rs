//! GetMemberHandler - single member lookup by key or public id.

use std::sync::Arc;

use crate::domain::foundation::{Actor, MemberRef, Permission};
use crate::domain::member::{Member, MemberError};
use crate::ports::{MemberStore, PermissionChecker};

use crate::application::handlers::lookup_member;

/// Query for one member.
#[derive(Debug, Clone)]
pub struct GetMemberQuery {
    pub member: MemberRef,
}

/// Handler for single-member lookups.
pub struct GetMemberHandler {
    members: Arc<dyn MemberStore>,
    permissions: Arc<dyn PermissionChecker>,
}

impl GetMemberHandler {
    pub fn new(members: Arc<dyn MemberStore>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self {
            members,
            permissions,
        }
    }

    pub async fn handle(&self, query: GetMemberQuery, actor: &Actor) -> Result<Member, MemberError> {
        self.permissions
            .require(actor, Permission::MemberView)
            .await?;
        lookup_member(self.members.as_ref(), &query.member).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMemberStore, StaticPermissionChecker};
    use crate::domain::foundation::{FamilyId, MemberId, MemberKey, Role, UserId};
    use crate::domain::member::{
        Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, MemberProfile,
        PersonName,
    };
    use chrono::NaiveDate;

    #[tokio::test]
    async fn finds_member_by_public_id() {
        let members = Arc::new(InMemoryMemberStore::new());
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
            MemberId::from_sequence(5),
            FamilyId::from_sequence(1),
            profile,
            FamilyLinks::default(),
        )
        .unwrap();
        members.insert(&member).await.unwrap();

        let handler = GetMemberHandler::new(
            members,
            Arc::new(StaticPermissionChecker::default_policy()),
        );
        let actor = Actor::new(UserId::new("u-1").unwrap(), "tester", Role::Member);

        let found = handler
            .handle(
                GetMemberQuery {
                    member: "M0005".parse().unwrap(),
                },
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(found.key(), member.key());
    }
}
