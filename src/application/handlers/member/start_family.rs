//! StartFamilyHandler - moves a member into a fresh household of their own.
//!
//! The member becomes the primary of a newly allocated family id. A male
//! member's children move with him (the patrilineal rule of the community);
//! a female member's children stay under their father's line.

use std::sync::Arc;

use crate::domain::foundation::{Actor, FamilyId, MemberRef, Permission};
use crate::domain::member::{Gender, Member, MemberError};
use crate::ports::{MemberStore, PermissionChecker};

use crate::application::handlers::lookup_member;
use crate::application::identifiers::IdentifierGenerator;

/// Command to start a new birth family.
#[derive(Debug, Clone)]
pub struct StartFamilyCommand {
    pub member: MemberRef,
}

/// Result of starting a family.
#[derive(Debug, Clone)]
pub struct StartFamilyResult {
    pub member: Member,
    pub family_id: FamilyId,
    pub moved_children: usize,
}

/// Handler for the start-family operation.
pub struct StartFamilyHandler {
    members: Arc<dyn MemberStore>,
    identifiers: Arc<IdentifierGenerator>,
    permissions: Arc<dyn PermissionChecker>,
}

impl StartFamilyHandler {
    pub fn new(
        members: Arc<dyn MemberStore>,
        identifiers: Arc<IdentifierGenerator>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            members,
            identifiers,
            permissions,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartFamilyCommand,
        actor: &Actor,
    ) -> Result<StartFamilyResult, MemberError> {
        self.permissions
            .require(actor, Permission::MemberEdit)
            .await?;

        let mut member = lookup_member(self.members.as_ref(), &cmd.member).await?;

        let family_id = self.identifiers.next_family_id().await?;
        member.assign_family(family_id.clone());
        member.set_primary(true);
        self.members.update(&member).await?;

        let mut moved_children = 0;
        if member.gender() == Gender::Male {
            let children = self.members.find_children_of(&[*member.key()]).await?;
            for mut child in children {
                child.assign_family(family_id.clone());
                self.members.update(&child).await?;
                moved_children += 1;
            }
        }

        tracing::info!(
            member = %member.member_id(),
            family = %family_id,
            moved_children,
            "started new birth family"
        );

        Ok(StartFamilyResult {
            member,
            family_id,
            moved_children,
        })
    }
}
