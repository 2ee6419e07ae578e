//! ResolveFamilyHandler - the compact "my family" query.

use std::sync::Arc;

use crate::domain::foundation::{Actor, FamilyId, MemberRef, Permission};
use crate::domain::member::{Member, MemberError};
use crate::ports::{MarriageStore, MemberStore, PermissionChecker};

use super::resolver::{FamilyResolver, ResolverOptions};
use crate::application::handlers::lookup_member;

/// Query for the household family view.
#[derive(Debug, Clone)]
pub struct ResolveFamilyQuery {
    pub member: MemberRef,
}

/// The resolved family of one member.
#[derive(Debug, Clone)]
pub struct FamilyView {
    pub family_id: FamilyId,
    pub is_primary: bool,
    pub members: Vec<Member>,
}

/// Handler for the household family view.
pub struct ResolveFamilyHandler {
    members: Arc<dyn MemberStore>,
    permissions: Arc<dyn PermissionChecker>,
    resolver: FamilyResolver,
}

impl ResolveFamilyHandler {
    pub fn new(
        members: Arc<dyn MemberStore>,
        marriages: Arc<dyn MarriageStore>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        let resolver = FamilyResolver::new(members.clone(), marriages);
        Self {
            members,
            permissions,
            resolver,
        }
    }

    pub async fn handle(
        &self,
        query: ResolveFamilyQuery,
        actor: &Actor,
    ) -> Result<FamilyView, MemberError> {
        self.permissions
            .require(actor, Permission::FamilyView)
            .await?;

        let target = lookup_member(self.members.as_ref(), &query.member).await?;
        let members = self
            .resolver
            .resolve(&target, &ResolverOptions::household())
            .await?;

        Ok(FamilyView {
            family_id: target.family_id().clone(),
            is_primary: target.is_primary(),
            members,
        })
    }
}
