//! UpsertMemberHandler - recursive create-or-update of a member together
//! with an optional spouse and children.
//!
//! The operation is atomic from the caller's perspective in the sense that
//! every sub-operation failure propagates: a member is never silently saved
//! with a half-linked spouse or dropped children. Only account provisioning
//! and caller linking are best-effort side operations.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::{try_join_all, BoxFuture};
use tokio::sync::Mutex;

use crate::application::handlers::provisioning::{AccountProvisioner, ProvisioningOutcome};
use crate::application::identifiers::IdentifierGenerator;
use crate::application::stats_cache::StatsCache;
use crate::domain::foundation::{
    Actor, ErrorCode, FamilyId, MarriageId, MemberKey, Permission,
};
use crate::domain::marriage::{Marriage, MarriageStatus};
use crate::domain::member::{
    clean, Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, Member,
    MemberCreated, MemberError, MemberEvent, MemberProfile, PersonName,
};
use crate::ports::{EventPublisher, MarriageStore, MemberStore, PermissionChecker};

use super::dashboard_stats::DashboardStats;

/// Retry budget for identifier allocation races.
const MAX_ALLOCATION_RETRIES: u32 = 3;

/// Flat member payload as supplied by callers.
///
/// Every field is optional; on update, absent fields keep their stored value.
/// The same shape is used for the nested spouse payload and children list.
#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    /// Existing internal identity; present means update-in-place.
    pub key: Option<MemberKey>,
    pub prefix: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub life_status: Option<LifeStatus>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub height: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub taluka: Option<String>,
    pub village: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub family_id: Option<FamilyId>,
    pub father: Option<MemberKey>,
    pub mother: Option<MemberKey>,
    /// Reference to an already-existing spouse member.
    pub spouse_key: Option<MemberKey>,
    /// Spouse payload to create or update alongside the member.
    pub spouse: Option<Box<MemberDraft>>,
    /// Children payloads, upserted with inherited context.
    pub children: Vec<MemberDraft>,
}

impl MemberDraft {
    fn wants_spouse(&self) -> bool {
        self.spouse.is_some() || self.spouse_key.is_some()
    }
}

/// Inherited context for recursive child upserts.
#[derive(Debug, Clone, Default)]
pub struct UpsertContext {
    pub family_id: Option<FamilyId>,
    pub father: Option<MemberKey>,
    pub mother: Option<MemberKey>,
    pub last_name: Option<String>,
}

/// Command wrapper around the payload.
#[derive(Debug, Clone)]
pub struct UpsertMemberCommand {
    pub draft: MemberDraft,
}

/// Result of an upsert.
#[derive(Debug, Clone)]
pub struct UpsertMemberResult {
    /// The saved member, reflecting the final resolved spouse link.
    pub member: Member,
    /// True when a new record was inserted (as opposed to updated).
    pub created: bool,
    /// Best-effort account provisioning outcome, creation only.
    pub provisioning: Option<ProvisioningOutcome>,
    /// True when the caller's own account was linked to the new member.
    pub linked_caller: bool,
}

/// The member upsert engine.
pub struct UpsertMemberHandler {
    members: Arc<dyn MemberStore>,
    marriages: Arc<dyn MarriageStore>,
    identifiers: Arc<IdentifierGenerator>,
    permissions: Arc<dyn PermissionChecker>,
    events: Arc<dyn EventPublisher>,
    provisioner: Arc<AccountProvisioner>,
    stats: Arc<StatsCache<DashboardStats>>,
    /// Serializes the duplicate-marriage check against marriage creation.
    marriage_guard: Mutex<()>,
}

impl UpsertMemberHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        members: Arc<dyn MemberStore>,
        marriages: Arc<dyn MarriageStore>,
        identifiers: Arc<IdentifierGenerator>,
        permissions: Arc<dyn PermissionChecker>,
        events: Arc<dyn EventPublisher>,
        provisioner: Arc<AccountProvisioner>,
        stats: Arc<StatsCache<DashboardStats>>,
    ) -> Self {
        Self {
            members,
            marriages,
            identifiers,
            permissions,
            events,
            provisioner,
            stats,
            marriage_guard: Mutex::new(()),
        }
    }

    pub async fn handle(
        &self,
        cmd: UpsertMemberCommand,
        actor: &Actor,
    ) -> Result<UpsertMemberResult, MemberError> {
        let permission = if cmd.draft.key.is_some() {
            Permission::MemberEdit
        } else {
            Permission::MemberCreate
        };
        self.permissions.require(actor, permission).await?;

        let (member, created) = self
            .upsert_recursive(cmd.draft, UpsertContext::default())
            .await?;

        self.stats.invalidate().await;

        let mut provisioning = None;
        let mut linked_caller = false;
        if created {
            provisioning = Some(match self.provisioner.provision(&member, actor).await {
                Ok(account) => ProvisioningOutcome::Provisioned {
                    username: account.username,
                    verified: account.verified,
                },
                Err(err) => {
                    tracing::warn!(
                        member = %member.member_id(),
                        error = %err,
                        "account provisioning failed"
                    );
                    ProvisioningOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            });

            linked_caller = match self.provisioner.link_caller(actor, &member).await {
                Ok(linked) => linked,
                Err(err) => {
                    tracing::warn!(
                        member = %member.member_id(),
                        error = %err,
                        "caller account linking failed"
                    );
                    false
                }
            };
        }

        Ok(UpsertMemberResult {
            member,
            created,
            provisioning,
            linked_caller,
        })
    }

    /// Upserts one member plus its spouse and children.
    ///
    /// Boxed because children recurse back into this function.
    fn upsert_recursive(
        &self,
        mut draft: MemberDraft,
        ctx: UpsertContext,
    ) -> BoxFuture<'_, Result<(Member, bool), MemberError>> {
        Box::pin(async move {
            // Inherit context for recursive child calls.
            if draft.family_id.is_none() {
                draft.family_id = ctx.family_id;
            }
            if draft.father.is_none() {
                draft.father = ctx.father;
            }
            if draft.mother.is_none() {
                draft.mother = ctx.mother;
            }
            if draft.last_name.is_none() {
                draft.last_name = ctx.last_name;
            }

            let (mut member, created) = match draft.key {
                Some(key) => self.update_existing(key, &draft).await?,
                None => self.insert_new(&draft).await?,
            };

            // Spouse resolution happens-before marriage creation; both
            // happen-before children so the child context sees the final
            // parent record.
            if draft.wants_spouse() {
                member = self.upsert_spouse(member, &draft).await?;
            }

            if !draft.children.is_empty() {
                let child_ctx = UpsertContext {
                    family_id: Some(member.family_id().clone()),
                    father: (member.gender() == Gender::Male).then(|| *member.key()),
                    mother: (member.gender() == Gender::Female).then(|| *member.key()),
                    last_name: Some(member.name().last().to_string()),
                };
                // Children are mutually independent once the parent is saved.
                try_join_all(
                    draft
                        .children
                        .into_iter()
                        .map(|child| self.upsert_recursive(child, child_ctx.clone())),
                )
                .await?;
            }

            Ok((member, created))
        })
    }

    async fn insert_new(&self, draft: &MemberDraft) -> Result<(Member, bool), MemberError> {
        let profile = build_profile(draft, None)?;

        // Duplicate-child guard: same name under the same parent is a
        // conflict, not a second record.
        if draft.father.is_some() || draft.mother.is_some() {
            let existing = self
                .members
                .find_child_named(
                    profile.name.first(),
                    profile.name.last(),
                    draft.father.as_ref(),
                    draft.mother.as_ref(),
                )
                .await?;
            if existing.is_some() {
                return Err(MemberError::duplicate_child(format!(
                    "{} {}",
                    profile.name.first(),
                    profile.name.last()
                )));
            }
        }

        let assigned_family = match &draft.family_id {
            Some(family) if !family.is_new_request() => Some(family.clone()),
            _ => None,
        };
        let links = FamilyLinks {
            father: draft.father,
            mother: draft.mother,
            spouse: None,
        };

        // Identifier allocation is read-then-write: the store's uniqueness
        // constraints turn a lost race into a Conflict, which we answer by
        // reallocating and retrying.
        let mut attempts = 0;
        loop {
            let member_id = self.identifiers.next_member_id().await?;
            let family_id = match &assigned_family {
                Some(family) => family.clone(),
                None => self.identifiers.next_family_id().await?,
            };

            let mut member = Member::create(
                MemberKey::new(),
                member_id,
                family_id,
                profile.clone(),
                links,
            )?;

            // First member of a household becomes its head.
            if member.family_id().is_assigned()
                && self.members.count_in_family(member.family_id()).await? == 0
            {
                member.set_primary(true);
            }

            match self.members.insert(&member).await {
                Ok(()) => {
                    tracing::info!(
                        member = %member.member_id(),
                        family = %member.family_id(),
                        "member created"
                    );
                    self.events
                        .publish(MemberEvent::Created(MemberCreated {
                            key: *member.key(),
                            member_id: member.member_id().clone(),
                            family_id: member.family_id().clone(),
                            full_name: member.full_name().to_string(),
                        }))
                        .await?;
                    return Ok((member, true));
                }
                Err(e) if e.code == ErrorCode::Conflict && attempts < MAX_ALLOCATION_RETRIES => {
                    attempts += 1;
                    tracing::debug!(attempt = attempts, "identifier conflict, reallocating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn update_existing(
        &self,
        key: MemberKey,
        draft: &MemberDraft,
    ) -> Result<(Member, bool), MemberError> {
        let mut member = self
            .members
            .find_by_key(&key)
            .await?
            .ok_or_else(|| MemberError::not_found(key.to_string()))?;

        let previous_status = member.marital_status();
        let profile = build_profile(draft, Some(&member))?;
        let new_status = profile.marital_status;
        member.apply_profile(profile);

        if draft.father.is_some() || draft.mother.is_some() {
            let father = draft.father.or_else(|| member.father().copied());
            let mother = draft.mother.or_else(|| member.mother().copied());
            member.set_parents(father, mother)?;
        }

        if let Some(family) = &draft.family_id {
            if family.is_new_request() {
                let fresh = self.identifiers.next_family_id().await?;
                member.assign_family(fresh);
                member.set_primary(true);
            } else if family != member.family_id() {
                member.assign_family(family.clone());
            }
        }

        // A root member marrying without a household starts one.
        if new_status == MaritalStatus::Married
            && previous_status != MaritalStatus::Married
            && member.is_root()
            && !member.family_id().is_assigned()
        {
            let fresh = self.identifiers.next_family_id().await?;
            member.assign_family(fresh);
            member.set_primary(true);
        }

        if previous_status == MaritalStatus::Married
            && matches!(new_status, MaritalStatus::Divorced | MaritalStatus::Widowed)
        {
            self.dissolve_active_marriage(&mut member, new_status).await?;
        }

        self.members.update(&member).await?;
        Ok((member, false))
    }

    /// Applies the dissolution rule: the Active marriage transitions to the
    /// matching terminal status and the cached spouse links are cleared on
    /// both parties.
    async fn dissolve_active_marriage(
        &self,
        member: &mut Member,
        new_status: MaritalStatus,
    ) -> Result<(), MemberError> {
        let Some(mut marriage) = self.marriages.find_active_for(member.key()).await? else {
            return Ok(());
        };

        let terminal = match new_status {
            MaritalStatus::Divorced => MarriageStatus::Divorced,
            _ => MarriageStatus::Widowed,
        };
        marriage.dissolve(terminal)?;
        self.marriages.update(&marriage).await?;

        member.clear_spouse();
        if let Some(partner_key) = marriage.partner_of(member.key()) {
            if let Some(mut partner) = self.members.find_by_key(&partner_key).await? {
                partner.clear_spouse();
                self.members.update(&partner).await?;
            }
        }

        self.events
            .publish(MemberEvent::MarriageDissolved {
                marriage: *marriage.id(),
            })
            .await?;
        Ok(())
    }

    /// Resolves (create-or-reuse) the spouse, then writes the marriage record
    /// and the bidirectional legacy links.
    async fn upsert_spouse(
        &self,
        mut member: Member,
        draft: &MemberDraft,
    ) -> Result<Member, MemberError> {
        let spouse_draft = draft
            .spouse
            .as_deref()
            .cloned()
            .unwrap_or_default();

        let _guard = self.marriage_guard.lock().await;

        // An explicit reference or an existing Active marriage means update,
        // never a second spouse record.
        let existing_key = match draft.spouse_key.or(spouse_draft.key) {
            Some(key) => Some(key),
            None => self
                .marriages
                .find_active_for(member.key())
                .await?
                .and_then(|m| m.partner_of(member.key())),
        };

        let mut spouse = match existing_key {
            Some(key) => {
                let existing = self
                    .members
                    .find_by_key(&key)
                    .await?
                    .ok_or_else(|| MemberError::not_found(key.to_string()))?;
                let mut updated = existing;
                let profile = build_profile(&spouse_draft, Some(&updated))?;
                updated.apply_profile(profile);
                self.members.update(&updated).await?;
                updated
            }
            None => {
                let draft = spouse_defaults(spouse_draft, &member);
                self.insert_new(&draft).await?.0
            }
        };

        // Marriage record only after the spouse is resolved.
        let marriage = match self
            .marriages
            .find_for_pair(member.key(), spouse.key())
            .await?
        {
            Some(mut existing) => {
                if !existing.is_active() {
                    existing.reactivate();
                    self.marriages.update(&existing).await?;
                }
                existing
            }
            None => {
                let marriage = Marriage::between(MarriageId::new(), &member, &spouse)?;
                self.marriages.insert(&marriage).await?;
                marriage
            }
        };

        // Bidirectional legacy links mirror the marriage record.
        member.link_spouse(*spouse.key(), spouse.full_name().to_string())?;
        spouse.link_spouse(*member.key(), member.full_name().to_string())?;
        self.members.update(&member).await?;
        self.members.update(&spouse).await?;

        self.events
            .publish(MemberEvent::SpousesLinked {
                marriage: *marriage.id(),
                husband: *marriage.husband(),
                wife: *marriage.wife(),
            })
            .await?;

        Ok(member)
    }
}

/// Fills spouse-creation defaults from the member being saved: same
/// household, opposite gender, the member's surname (when the member is
/// male), dob fallback, and the member's location.
fn spouse_defaults(mut draft: MemberDraft, member: &Member) -> MemberDraft {
    if draft.family_id.is_none() {
        draft.family_id = Some(member.family_id().clone());
    }
    if draft.gender.is_none() {
        draft.gender = Some(member.gender().opposite());
    }
    if draft.last_name.is_none() && member.gender() == Gender::Male {
        draft.last_name = Some(member.name().last().to_string());
    }
    if draft.dob.is_none() {
        draft.dob = Some(member.dob());
    }
    if draft.marital_status.is_none() {
        draft.marital_status = Some(MaritalStatus::Married);
    }
    let location = &member.profile().location;
    if draft.state.is_none() {
        draft.state = location.state.clone();
    }
    if draft.district.is_none() {
        draft.district = location.district.clone();
    }
    if draft.taluka.is_none() {
        draft.taluka = location.taluka.clone();
    }
    if draft.village.is_none() {
        draft.village = location.village.clone();
    }
    if draft.address.is_none() {
        draft.address = location.address.clone();
    }
    draft
}

/// Builds the validated profile from a draft, merging over an existing member
/// on update. Missing required fields on creation surface as per-field
/// validation errors.
fn build_profile(
    draft: &MemberDraft,
    existing: Option<&Member>,
) -> Result<MemberProfile, MemberError> {
    let name = match existing {
        Some(member) => PersonName::new(
            draft.prefix.as_deref().or_else(|| member.name().prefix()),
            draft
                .first_name
                .as_deref()
                .unwrap_or_else(|| member.name().first()),
            draft.middle_name.as_deref().or_else(|| member.name().middle()),
            draft
                .last_name
                .as_deref()
                .unwrap_or_else(|| member.name().last()),
        )?,
        None => {
            let first = draft
                .first_name
                .as_deref()
                .ok_or_else(|| required("firstName"))?;
            let last = draft
                .last_name
                .as_deref()
                .ok_or_else(|| required("lastName"))?;
            PersonName::new(
                draft.prefix.as_deref(),
                first,
                draft.middle_name.as_deref(),
                last,
            )?
        }
    };

    let gender = draft
        .gender
        .or(existing.map(Member::gender))
        .ok_or_else(|| required("gender"))?;
    let dob = draft
        .dob
        .or(existing.map(Member::dob))
        .ok_or_else(|| required("dob"))?;
    let marital_status = draft
        .marital_status
        .or(existing.map(Member::marital_status))
        .ok_or_else(|| required("maritalStatus"))?;
    let life_status = draft
        .life_status
        .or(existing.map(Member::life_status))
        .unwrap_or(LifeStatus::Alive);

    let prior = existing.map(Member::profile);
    let biodata = Biodata {
        occupation: text(draft.occupation.as_deref(), prior.and_then(|p| p.biodata.occupation.clone())),
        education: text(draft.education.as_deref(), prior.and_then(|p| p.biodata.education.clone())),
        height: text(draft.height.as_deref(), prior.and_then(|p| p.biodata.height.clone())),
        phone: text(draft.phone.as_deref(), prior.and_then(|p| p.biodata.phone.clone())),
        email: text(draft.email.as_deref(), prior.and_then(|p| p.biodata.email.clone())),
    };
    let location = Location {
        state: text(draft.state.as_deref(), prior.and_then(|p| p.location.state.clone())),
        district: text(draft.district.as_deref(), prior.and_then(|p| p.location.district.clone())),
        taluka: text(draft.taluka.as_deref(), prior.and_then(|p| p.location.taluka.clone())),
        village: text(draft.village.as_deref(), prior.and_then(|p| p.location.village.clone())),
        address: text(draft.address.as_deref(), prior.and_then(|p| p.location.address.clone())),
    };

    Ok(MemberProfile {
        name,
        gender,
        dob,
        marital_status,
        life_status,
        biodata,
        location,
        photo_url: draft
            .photo_url
            .clone()
            .or_else(|| existing.and_then(|m| m.profile().photo_url.clone())),
    })
}

fn required(field: &str) -> MemberError {
    MemberError::validation(field, format!("Field '{}' is required", field))
}

/// Cleaned draft value, falling back to the stored one.
fn text(incoming: Option<&str>, stored: Option<String>) -> Option<String> {
    incoming.and_then(clean).or(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccountDirectory, InMemoryEventBus, InMemoryMarriageStore, InMemoryMemberStore,
        StaticPermissionChecker,
    };
    use crate::application::handlers::provisioning::ProvisioningDefaults;
    use crate::domain::foundation::{DomainError, ErrorCode, Role, UserId};
    use crate::ports::{Account, AccountDirectory, NewAccount};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Fixture {
        members: Arc<InMemoryMemberStore>,
        marriages: Arc<InMemoryMarriageStore>,
        events: Arc<InMemoryEventBus>,
        handler: UpsertMemberHandler,
    }

    fn fixture() -> Fixture {
        fixture_with_directory(Arc::new(InMemoryAccountDirectory::new()))
    }

    fn fixture_with_directory(directory: Arc<dyn AccountDirectory>) -> Fixture {
        let members = Arc::new(InMemoryMemberStore::new());
        let marriages = Arc::new(InMemoryMarriageStore::new());
        let events = Arc::new(InMemoryEventBus::new());
        let identifiers = Arc::new(IdentifierGenerator::new(members.clone()));
        let provisioner = Arc::new(AccountProvisioner::new(
            directory,
            ProvisioningDefaults {
                default_password: "123456".to_string(),
            },
        ));
        let handler = UpsertMemberHandler::new(
            members.clone(),
            marriages.clone(),
            identifiers,
            Arc::new(StaticPermissionChecker::default_policy()),
            events.clone(),
            provisioner,
            Arc::new(StatsCache::new(Duration::from_secs(300))),
        );
        Fixture {
            members,
            marriages,
            events,
            handler,
        }
    }

    fn admin() -> Actor {
        Actor::new(UserId::new("admin-1").unwrap(), "admin", Role::Admin)
    }

    fn base_draft(first: &str) -> MemberDraft {
        MemberDraft {
            first_name: Some(first.to_string()),
            last_name: Some("Patil".to_string()),
            gender: Some(Gender::Male),
            dob: NaiveDate::from_ymd_opt(1980, 5, 1),
            marital_status: Some(MaritalStatus::Single),
            ..MemberDraft::default()
        }
    }

    fn spouse_draft(first: &str) -> MemberDraft {
        MemberDraft {
            first_name: Some(first.to_string()),
            ..MemberDraft::default()
        }
    }

    #[tokio::test]
    async fn creates_member_with_generated_ids_and_primary_flag() {
        let fx = fixture();
        let result = fx
            .handler
            .handle(
                UpsertMemberCommand {
                    draft: base_draft("Ram"),
                },
                &admin(),
            )
            .await
            .unwrap();

        assert!(result.created);
        assert_eq!(result.member.member_id().as_str(), "M0001");
        assert_eq!(result.member.family_id().as_str(), "F0001");
        assert!(result.member.is_primary());
        assert_eq!(result.member.full_name(), "Ram Patil");
    }

    #[tokio::test]
    async fn missing_required_fields_fail_with_field_detail() {
        let fx = fixture();
        let draft = MemberDraft {
            first_name: Some("Ram".to_string()),
            last_name: Some("Patil".to_string()),
            gender: Some(Gender::Male),
            dob: None,
            marital_status: Some(MaritalStatus::Single),
            ..MemberDraft::default()
        };
        let result = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await;

        assert!(matches!(
            result,
            Err(MemberError::ValidationFailed { field, .. }) if field == "dob"
        ));
    }

    #[tokio::test]
    async fn spouse_is_created_with_marriage_and_bidirectional_links() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.marital_status = Some(MaritalStatus::Married);
        draft.spouse = Some(Box::new(spouse_draft("Sita")));

        let result = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();
        let member = result.member;

        let spouse_key = *member.spouse().expect("spouse link must be set");
        let spouse = fx.members.find_by_key(&spouse_key).await.unwrap().unwrap();

        assert_eq!(spouse.spouse(), Some(member.key()));
        assert_eq!(spouse.family_id(), member.family_id());
        assert_eq!(spouse.gender(), Gender::Female);
        assert_eq!(spouse.name().last(), "Patil");
        assert_eq!(member.spouse_full_name(), Some("Sita Patil"));

        let marriage = fx
            .marriages
            .find_active_for(member.key())
            .await
            .unwrap()
            .expect("active marriage must exist");
        assert_eq!(marriage.husband(), member.key());
        assert_eq!(marriage.wife(), spouse.key());
    }

    #[tokio::test]
    async fn repeated_spouse_payload_updates_instead_of_duplicating() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.marital_status = Some(MaritalStatus::Married);
        draft.spouse = Some(Box::new(spouse_draft("Sita")));
        let first = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();

        // Same member again, same spouse name: must update the linked spouse.
        let mut again = MemberDraft {
            key: Some(*first.member.key()),
            ..MemberDraft::default()
        };
        let mut spouse = spouse_draft("Sita");
        spouse.education = Some("BA".to_string());
        again.spouse = Some(Box::new(spouse));

        let second = fx
            .handler
            .handle(UpsertMemberCommand { draft: again }, &admin())
            .await
            .unwrap();

        // Two members total: Ram and one Sita.
        let family = fx
            .members
            .find_by_family(second.member.family_id())
            .await
            .unwrap();
        assert_eq!(family.len(), 2);

        let spouse_key = *second.member.spouse().unwrap();
        let spouse = fx.members.find_by_key(&spouse_key).await.unwrap().unwrap();
        assert_eq!(spouse.profile().biodata.education.as_deref(), Some("BA"));

        // And exactly one marriage record for the pair.
        let touching = fx
            .marriages
            .find_active_touching(&[*second.member.key()])
            .await
            .unwrap();
        assert_eq!(touching.len(), 1);
    }

    #[tokio::test]
    async fn children_inherit_family_surname_and_parent_link() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.children = vec![
            MemberDraft {
                first_name: Some("Arjun".to_string()),
                gender: Some(Gender::Male),
                dob: NaiveDate::from_ymd_opt(2010, 3, 1),
                marital_status: Some(MaritalStatus::Single),
                ..MemberDraft::default()
            },
            MemberDraft {
                first_name: Some("Anita".to_string()),
                gender: Some(Gender::Female),
                dob: NaiveDate::from_ymd_opt(2012, 7, 1),
                marital_status: Some(MaritalStatus::Single),
                ..MemberDraft::default()
            },
        ];

        let result = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();
        let father = result.member;

        let children = fx.members.find_children_of(&[*father.key()]).await.unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.father(), Some(father.key()));
            assert_eq!(child.family_id(), father.family_id());
            assert_eq!(child.name().last(), "Patil");
            assert!(!child.is_primary());
        }
    }

    #[tokio::test]
    async fn duplicate_child_is_rejected_with_conflict() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.children = vec![MemberDraft {
            first_name: Some("Arjun".to_string()),
            gender: Some(Gender::Male),
            dob: NaiveDate::from_ymd_opt(2010, 3, 1),
            marital_status: Some(MaritalStatus::Single),
            ..MemberDraft::default()
        }];
        let result = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();

        // Re-adding the same child (case-insensitively) under the father.
        let duplicate = MemberDraft {
            first_name: Some("ARJUN".to_string()),
            last_name: Some("patil".to_string()),
            gender: Some(Gender::Male),
            dob: NaiveDate::from_ymd_opt(2010, 3, 1),
            marital_status: Some(MaritalStatus::Single),
            father: Some(*result.member.key()),
            ..MemberDraft::default()
        };
        let outcome = fx
            .handler
            .handle(UpsertMemberCommand { draft: duplicate }, &admin())
            .await;

        assert!(matches!(outcome, Err(MemberError::DuplicateChild { .. })));
    }

    #[tokio::test]
    async fn update_of_missing_member_is_not_found() {
        let fx = fixture();
        let draft = MemberDraft {
            key: Some(MemberKey::new()),
            ..MemberDraft::default()
        };
        let result = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await;
        assert!(matches!(result, Err(MemberError::NotFound(_))));
    }

    #[tokio::test]
    async fn divorce_dissolves_marriage_and_clears_both_links() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.marital_status = Some(MaritalStatus::Married);
        draft.spouse = Some(Box::new(spouse_draft("Sita")));
        let created = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();
        let spouse_key = *created.member.spouse().unwrap();

        let update = MemberDraft {
            key: Some(*created.member.key()),
            marital_status: Some(MaritalStatus::Divorced),
            ..MemberDraft::default()
        };
        let updated = fx
            .handler
            .handle(UpsertMemberCommand { draft: update }, &admin())
            .await
            .unwrap();

        assert!(updated.member.spouse().is_none());
        let spouse = fx.members.find_by_key(&spouse_key).await.unwrap().unwrap();
        assert!(spouse.spouse().is_none());

        assert!(fx
            .marriages
            .find_active_for(updated.member.key())
            .await
            .unwrap()
            .is_none());
        let record = fx
            .marriages
            .find_for_pair(updated.member.key(), &spouse_key)
            .await
            .unwrap()
            .expect("record must survive dissolution");
        assert_eq!(record.status(), MarriageStatus::Divorced);
    }

    #[tokio::test]
    async fn marrying_root_member_without_household_starts_family() {
        let fx = fixture();
        let mut draft = base_draft("Ram");
        draft.family_id = Some(FamilyId::unassigned());
        let created = fx
            .handler
            .handle(UpsertMemberCommand { draft }, &admin())
            .await
            .unwrap();
        assert!(!created.member.family_id().is_assigned());

        let update = MemberDraft {
            key: Some(*created.member.key()),
            marital_status: Some(MaritalStatus::Married),
            ..MemberDraft::default()
        };
        let updated = fx
            .handler
            .handle(UpsertMemberCommand { draft: update }, &admin())
            .await
            .unwrap();

        assert!(updated.member.family_id().is_assigned());
        assert!(updated.member.is_primary());
    }

    #[tokio::test]
    async fn creation_publishes_member_created_event() {
        let fx = fixture();
        fx.handler
            .handle(
                UpsertMemberCommand {
                    draft: base_draft("Ram"),
                },
                &admin(),
            )
            .await
            .unwrap();

        assert!(fx.events.has_event("member.created.v1"));
    }

    struct FailingDirectory;

    #[async_trait]
    impl AccountDirectory for FailingDirectory {
        async fn username_taken(&self, _username: &str) -> Result<bool, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "directory down"))
        }

        async fn create(&self, _account: NewAccount) -> Result<Account, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "directory down"))
        }

        async fn find(&self, _user_id: &UserId) -> Result<Option<Account>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "directory down"))
        }

        async fn link_member(
            &self,
            _user_id: &UserId,
            _member: &MemberKey,
        ) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "directory down"))
        }
    }

    #[tokio::test]
    async fn provisioning_failure_is_reported_but_member_is_saved() {
        let fx = fixture_with_directory(Arc::new(FailingDirectory));
        let result = fx
            .handler
            .handle(
                UpsertMemberCommand {
                    draft: base_draft("Ram"),
                },
                &admin(),
            )
            .await
            .unwrap();

        assert!(result.created);
        assert!(matches!(
            result.provisioning,
            Some(ProvisioningOutcome::Failed { .. })
        ));
        assert!(!result.linked_caller);
        assert!(fx
            .members
            .find_by_key(result.member.key())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn non_admin_creation_provisions_pending_account() {
        let fx = fixture();
        let actor = Actor::new(UserId::new("user-9").unwrap(), "user9", Role::Member);
        let result = fx
            .handler
            .handle(
                UpsertMemberCommand {
                    draft: base_draft("Ram"),
                },
                &actor,
            )
            .await
            .unwrap();

        assert!(matches!(
            result.provisioning,
            Some(ProvisioningOutcome::Provisioned { verified: false, ref username })
                if username == "M0001"
        ));
    }
}
