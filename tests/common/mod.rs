//! Shared fixture wiring the full engine stack over in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use parivar::adapters::memory::{
    InMemoryAccountDirectory, InMemoryEventBus, InMemoryMarriageStore, InMemoryMemberStore,
    StaticPermissionChecker,
};
use parivar::application::handlers::family::{ResolveFamilyHandler, ResolveFamilyTreeHandler};
use parivar::application::handlers::member::{
    MemberDraft, UpsertMemberCommand, UpsertMemberHandler,
};
use parivar::application::handlers::provisioning::{AccountProvisioner, ProvisioningDefaults};
use parivar::application::identifiers::IdentifierGenerator;
use parivar::application::stats_cache::StatsCache;
use parivar::domain::foundation::{Actor, Role, UserId};
use parivar::domain::member::{Gender, MaritalStatus, Member};

pub struct TestApp {
    pub members: Arc<InMemoryMemberStore>,
    pub marriages: Arc<InMemoryMarriageStore>,
    pub events: Arc<InMemoryEventBus>,
    pub directory: Arc<InMemoryAccountDirectory>,
    pub upsert: UpsertMemberHandler,
    pub resolve_family: ResolveFamilyHandler,
    pub resolve_tree: ResolveFamilyTreeHandler,
}

impl TestApp {
    pub fn new() -> Self {
        let members = Arc::new(InMemoryMemberStore::new());
        let marriages = Arc::new(InMemoryMarriageStore::new());
        let events = Arc::new(InMemoryEventBus::new());
        let directory = Arc::new(InMemoryAccountDirectory::new());
        let permissions = Arc::new(StaticPermissionChecker::default_policy());
        let identifiers = Arc::new(IdentifierGenerator::new(members.clone()));
        let provisioner = Arc::new(AccountProvisioner::new(
            directory.clone(),
            ProvisioningDefaults {
                default_password: "123456".to_string(),
            },
        ));

        let upsert = UpsertMemberHandler::new(
            members.clone(),
            marriages.clone(),
            identifiers,
            permissions.clone(),
            events.clone(),
            provisioner,
            Arc::new(StatsCache::new(Duration::from_secs(300))),
        );
        let resolve_family = ResolveFamilyHandler::new(
            members.clone(),
            marriages.clone(),
            permissions.clone(),
        );
        let resolve_tree = ResolveFamilyTreeHandler::new(
            members.clone(),
            marriages.clone(),
            permissions,
            2,
        );

        Self {
            members,
            marriages,
            events,
            directory,
            upsert,
            resolve_family,
            resolve_tree,
        }
    }

    pub fn admin(&self) -> Actor {
        Actor::new(UserId::new("admin-1").unwrap(), "admin", Role::Admin)
    }

    pub async fn create(&self, draft: MemberDraft) -> Member {
        self.upsert
            .handle(UpsertMemberCommand { draft }, &self.admin())
            .await
            .expect("upsert must succeed")
            .member
    }
}

pub fn draft(first: &str, gender: Gender, marital: MaritalStatus) -> MemberDraft {
    MemberDraft {
        first_name: Some(first.to_string()),
        last_name: Some("Patil".to_string()),
        gender: Some(gender),
        dob: NaiveDate::from_ymd_opt(1975, 6, 15),
        marital_status: Some(marital),
        ..MemberDraft::default()
    }
}
