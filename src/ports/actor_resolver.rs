//! Actor resolver port.
//!
//! Turns an opaque bearer token into an authenticated [`Actor`]. Whether the
//! token is a JWT, a session id, or a test stub is the adapter's business.

use async_trait::async_trait;

use crate::domain::foundation::{Actor, DomainError};

/// Port for resolving bearer tokens to actors.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// Resolve a token.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for unknown or expired tokens
    async fn resolve(&self, token: &str) -> Result<Actor, DomainError>;
}
