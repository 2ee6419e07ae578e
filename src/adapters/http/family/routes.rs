//! HTTP routes for family endpoints.

use axum::{routing::get, Router};

use super::handlers::{family_tree, my_family, FamilyHandlers};

/// Creates the family router with all endpoints.
pub fn family_routes(handlers: FamilyHandlers) -> Router {
    Router::new()
        .route("/my-family", get(my_family))
        .route("/:id/tree", get(family_tree))
        .with_state(handlers)
}
