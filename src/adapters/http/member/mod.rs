//! HTTP adapter for member endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    DashboardStatsResponse, MemberRequest, MemberResponse, ProvisioningBody, StartFamilyResponse,
    UpsertMemberResponse,
};
pub use handlers::MemberHandlers;
pub use routes::member_routes;
