//! HTTP handlers for member endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{error_body, member_error_response};
use crate::application::handlers::member::{
    DashboardStatsHandler, GetMemberHandler, GetMemberQuery, StartFamilyCommand,
    StartFamilyHandler, UpsertMemberCommand, UpsertMemberHandler,
};
use crate::domain::foundation::{MemberKey, MemberRef};

use super::dto::{
    DashboardStatsResponse, MemberRequest, MemberResponse, StartFamilyResponse,
    UpsertMemberResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MemberHandlers {
    upsert_handler: Arc<UpsertMemberHandler>,
    get_handler: Arc<GetMemberHandler>,
    start_family_handler: Arc<StartFamilyHandler>,
    stats_handler: Arc<DashboardStatsHandler>,
}

impl MemberHandlers {
    pub fn new(
        upsert_handler: Arc<UpsertMemberHandler>,
        get_handler: Arc<GetMemberHandler>,
        start_family_handler: Arc<StartFamilyHandler>,
        stats_handler: Arc<DashboardStatsHandler>,
    ) -> Self {
        Self {
            upsert_handler,
            get_handler,
            start_family_handler,
            stats_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/members - Create a member (plus spouse/children)
pub async fn create_member(
    State(handlers): State<MemberHandlers>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<MemberRequest>,
) -> Response {
    let draft = match request.into_draft() {
        Ok(draft) => draft,
        Err(e) => return member_error_response(e),
    };

    match handlers
        .upsert_handler
        .handle(UpsertMemberCommand { draft }, &actor)
        .await
    {
        Ok(result) => {
            let response = UpsertMemberResponse {
                member: result.member.into(),
                created: result.created,
                provisioning: result.provisioning.map(Into::into),
                linked_caller: result.linked_caller,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}

/// PUT /api/members/:key - Update a member (plus spouse/children)
pub async fn update_member(
    State(handlers): State<MemberHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(key): Path<String>,
    Json(request): Json<MemberRequest>,
) -> Response {
    let key = match key.parse::<MemberKey>() {
        Ok(key) => key,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_body("BAD_REQUEST", "Invalid member key")),
            )
                .into_response()
        }
    };

    let mut draft = match request.into_draft() {
        Ok(draft) => draft,
        Err(e) => return member_error_response(e),
    };
    draft.key = Some(key);

    match handlers
        .upsert_handler
        .handle(UpsertMemberCommand { draft }, &actor)
        .await
    {
        Ok(result) => {
            let response = UpsertMemberResponse {
                member: result.member.into(),
                created: result.created,
                provisioning: result.provisioning.map(Into::into),
                linked_caller: result.linked_caller,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}

/// GET /api/members/:ref - Fetch one member by key or public id
pub async fn get_member(
    State(handlers): State<MemberHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(reference): Path<String>,
) -> Response {
    let member = match reference.parse::<MemberRef>() {
        Ok(r) => r,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_body("BAD_REQUEST", "Invalid member reference")),
            )
                .into_response()
        }
    };

    match handlers
        .get_handler
        .handle(GetMemberQuery { member }, &actor)
        .await
    {
        Ok(member) => {
            let response: MemberResponse = member.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}

/// POST /api/members/:ref/create-family - Start a new birth family
pub async fn start_family(
    State(handlers): State<MemberHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(reference): Path<String>,
) -> Response {
    let member = match reference.parse::<MemberRef>() {
        Ok(r) => r,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_body("BAD_REQUEST", "Invalid member reference")),
            )
                .into_response()
        }
    };

    match handlers
        .start_family_handler
        .handle(StartFamilyCommand { member }, &actor)
        .await
    {
        Ok(result) => {
            let response = StartFamilyResponse {
                family_id: result.family_id.to_string(),
                member: result.member.into(),
                moved_children: result.moved_children,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}

/// GET /api/members/stats/dashboard - Aggregate member counts
pub async fn dashboard_stats(
    State(handlers): State<MemberHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Response {
    match handlers.stats_handler.handle(&actor).await {
        Ok(stats) => {
            let response = DashboardStatsResponse {
                total: stats.counts.total,
                male: stats.counts.male,
                female: stats.counts.female,
                married: stats.counts.married,
                single_male: stats.counts.single_male,
                single_female: stats.counts.single_female,
                primary: stats.counts.primary,
                families: stats.counts.families,
                generated_at: stats.generated_at.as_datetime().to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}
