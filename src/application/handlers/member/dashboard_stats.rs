//! DashboardStatsHandler - aggregate member counts behind a short-TTL cache.

use std::sync::Arc;

use crate::application::stats_cache::StatsCache;
use crate::domain::foundation::{Actor, Permission, Timestamp};
use crate::domain::member::MemberError;
use crate::ports::{MemberCounts, MemberStore, PermissionChecker};

/// Aggregate statistics served to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub counts: MemberCounts,
    pub generated_at: Timestamp,
}

/// Handler for dashboard statistics.
///
/// Results are cached in-process; every member write invalidates the cache
/// through the shared [`StatsCache`] handle.
pub struct DashboardStatsHandler {
    members: Arc<dyn MemberStore>,
    permissions: Arc<dyn PermissionChecker>,
    cache: Arc<StatsCache<DashboardStats>>,
}

impl DashboardStatsHandler {
    pub fn new(
        members: Arc<dyn MemberStore>,
        permissions: Arc<dyn PermissionChecker>,
        cache: Arc<StatsCache<DashboardStats>>,
    ) -> Self {
        Self {
            members,
            permissions,
            cache,
        }
    }

    pub async fn handle(&self, actor: &Actor) -> Result<DashboardStats, MemberError> {
        self.permissions
            .require(actor, Permission::MemberView)
            .await?;

        if let Some(stats) = self.cache.get().await {
            return Ok(stats);
        }

        let counts = self.members.member_counts().await?;
        let stats = DashboardStats {
            counts,
            generated_at: Timestamp::now(),
        };
        self.cache.set(stats.clone()).await;
        Ok(stats)
    }
}
