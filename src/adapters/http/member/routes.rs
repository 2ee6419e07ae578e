//! HTTP routes for member endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    create_member, dashboard_stats, get_member, start_family, update_member, MemberHandlers,
};

/// Creates the member router with all endpoints.
pub fn member_routes(handlers: MemberHandlers) -> Router {
    Router::new()
        .route("/", post(create_member))
        .route("/stats/dashboard", get(dashboard_stats))
        .route("/:id", get(get_member))
        .route("/:id", put(update_member))
        .route("/:id/create-family", post(start_family))
        .with_state(handlers)
}
