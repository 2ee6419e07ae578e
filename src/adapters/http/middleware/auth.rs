//! Authentication middleware and extractors for axum.
//!
//! The middleware validates Bearer tokens through the `ActorResolver` port,
//! keeping it provider-agnostic: a JWT validator, an opaque session lookup,
//! or a static test resolver all plug in the same way.
//!
//! ```text
//! Request → auth_middleware → injects Actor into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads it back
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{Actor, ErrorCode};
use crate::ports::ActorResolver;

use super::super::error_body;

/// Auth middleware state - the token resolver.
pub type AuthState = Arc<dyn ActorResolver>;

/// Validates the Bearer token and injects the [`Actor`] into extensions.
///
/// Requests without an Authorization header pass through unauthenticated;
/// protected handlers reject them via the [`RequireAuth`] extractor. Invalid
/// tokens are rejected here with 401.
pub async fn auth_middleware(
    State(resolver): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match resolver.resolve(token).await {
            Ok(actor) => {
                request.extensions_mut().insert(actor);
                next.run(request).await
            }
            Err(e) if e.code == ErrorCode::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(error_body("UNAUTHORIZED", e.message)),
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "actor resolution failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(error_body(
                        "SERVICE_UNAVAILABLE",
                        "Authentication service unavailable",
                    )),
                )
                    .into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor requiring an authenticated actor.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Actor);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Actor>()
                .cloned()
                .map(RequireAuth)
                .ok_or_else(|| {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(error_body("UNAUTHORIZED", "Authentication required")),
                    )
                        .into_response()
                })
        })
    }
}
