//! HTTP adapter for family endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{FamilyResponse, FamilyTreeResponse};
pub use handlers::FamilyHandlers;
pub use routes::family_routes;
