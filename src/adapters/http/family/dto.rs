//! HTTP DTOs for family endpoints.

use serde::Serialize;

use crate::adapters::http::member::MemberResponse;
use crate::application::handlers::family::FamilyView;

/// The resolved family of the caller or a target member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyResponse {
    pub family_id: String,
    pub is_primary: bool,
    pub members: Vec<MemberResponse>,
}

impl From<FamilyView> for FamilyResponse {
    fn from(view: FamilyView) -> Self {
        Self {
            family_id: view.family_id.to_string(),
            is_primary: view.is_primary,
            members: view.members.into_iter().map(Into::into).collect(),
        }
    }
}

/// The resolved family tree: an unordered member list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTreeResponse {
    pub members: Vec<MemberResponse>,
}
