//! ResolveFamilyTreeHandler - the richer tree-view query.

use std::sync::Arc;

use crate::domain::foundation::{Actor, MemberRef, Permission};
use crate::domain::member::{Member, MemberError};
use crate::ports::{MarriageStore, MemberStore, PermissionChecker};

use super::resolver::{FamilyResolver, ResolverOptions};
use crate::application::handlers::lookup_member;

/// Query for the family tree view.
#[derive(Debug, Clone)]
pub struct ResolveFamilyTreeQuery {
    pub member: MemberRef,
}

/// Handler for the family tree view: deeper descendant expansion, ancestors
/// for everything in scope, and the target's in-laws.
pub struct ResolveFamilyTreeHandler {
    members: Arc<dyn MemberStore>,
    permissions: Arc<dyn PermissionChecker>,
    resolver: FamilyResolver,
    options: ResolverOptions,
}

impl ResolveFamilyTreeHandler {
    pub fn new(
        members: Arc<dyn MemberStore>,
        marriages: Arc<dyn MarriageStore>,
        permissions: Arc<dyn PermissionChecker>,
        descendant_depth: u32,
    ) -> Self {
        let resolver = FamilyResolver::new(members.clone(), marriages);
        Self {
            members,
            permissions,
            resolver,
            options: ResolverOptions::tree(descendant_depth),
        }
    }

    pub async fn handle(
        &self,
        query: ResolveFamilyTreeQuery,
        actor: &Actor,
    ) -> Result<Vec<Member>, MemberError> {
        self.permissions
            .require(actor, Permission::FamilyView)
            .await?;

        let target = lookup_member(self.members.as_ref(), &query.member).await?;
        let members = self.resolver.resolve(&target, &self.options).await?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryMarriageStore, InMemoryMemberStore, StaticPermissionChecker,
    };
    use crate::domain::foundation::{FamilyId, MemberId, MemberKey, Role, UserId};
    use crate::domain::member::{
        Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, MemberProfile,
        PersonName,
    };
    use chrono::NaiveDate;

    fn actor() -> Actor {
        Actor::new(UserId::new("u-1").unwrap(), "tester", Role::Member)
    }

    fn member(seq: u32, family: FamilyId, links: FamilyLinks) -> Member {
        let profile = MemberProfile {
            name: PersonName::new(None, "Person", None, "Patil").unwrap(),
            gender: Gender::Male,
            dob: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            marital_status: MaritalStatus::Single,
            life_status: LifeStatus::Alive,
            biodata: Biodata::default(),
            location: Location::default(),
            photo_url: None,
        };
        Member::create(MemberKey::new(), MemberId::from_sequence(seq), family, profile, links)
            .unwrap()
    }

    #[tokio::test]
    async fn tree_reaches_birth_family_of_married_out_target() {
        let members = Arc::new(InMemoryMemberStore::new());
        let marriages = Arc::new(InMemoryMarriageStore::new());

        let dad = member(1, FamilyId::from_sequence(1), FamilyLinks::default());
        let daughter = member(
            2,
            FamilyId::from_sequence(2),
            FamilyLinks {
                father: Some(*dad.key()),
                mother: None,
                spouse: None,
            },
        );
        members.insert(&dad).await.unwrap();
        members.insert(&daughter).await.unwrap();

        let handler = ResolveFamilyTreeHandler::new(
            members,
            marriages,
            Arc::new(StaticPermissionChecker::default_policy()),
            2,
        );

        let resolved = handler
            .handle(
                ResolveFamilyTreeQuery {
                    member: MemberRef::Public(daughter.member_id().clone()),
                },
                &actor(),
            )
            .await
            .unwrap();

        assert!(resolved.iter().any(|m| m.key() == dad.key()));
    }
}
