//! Member command and query handlers.

mod dashboard_stats;
mod get_member;
mod start_family;
mod upsert_member;

pub use dashboard_stats::{DashboardStats, DashboardStatsHandler};
pub use get_member::{GetMemberHandler, GetMemberQuery};
pub use start_family::{StartFamilyCommand, StartFamilyHandler, StartFamilyResult};
pub use upsert_member::{
    MemberDraft, UpsertContext, UpsertMemberCommand, UpsertMemberHandler, UpsertMemberResult,
};
