//! HTTP handlers for family endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{error_body, member_error_response};
use crate::application::handlers::family::{
    ResolveFamilyHandler, ResolveFamilyQuery, ResolveFamilyTreeHandler, ResolveFamilyTreeQuery,
};
use crate::domain::foundation::MemberRef;

use super::dto::{FamilyResponse, FamilyTreeResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct FamilyHandlers {
    resolve_handler: Arc<ResolveFamilyHandler>,
    tree_handler: Arc<ResolveFamilyTreeHandler>,
}

impl FamilyHandlers {
    pub fn new(
        resolve_handler: Arc<ResolveFamilyHandler>,
        tree_handler: Arc<ResolveFamilyTreeHandler>,
    ) -> Self {
        Self {
            resolve_handler,
            tree_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/family/my-family - The caller's own family
pub async fn my_family(
    State(handlers): State<FamilyHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Response {
    let Some(member_key) = actor.member else {
        return (
            StatusCode::BAD_REQUEST,
            Json(error_body(
                "BAD_REQUEST",
                "User is not linked to a member profile",
            )),
        )
            .into_response();
    };

    let query = ResolveFamilyQuery {
        member: MemberRef::Key(member_key),
    };
    match handlers.resolve_handler.handle(query, &actor).await {
        Ok(view) => {
            let response: FamilyResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}

/// GET /api/family/:ref/tree - Family tree for a target member
pub async fn family_tree(
    State(handlers): State<FamilyHandlers>,
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
        .tree_handler
        .handle(ResolveFamilyTreeQuery { member }, &actor)
        .await
    {
        Ok(members) => {
            let response = FamilyTreeResponse {
                members: members.into_iter().map(Into::into).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => member_error_response(e),
    }
}
