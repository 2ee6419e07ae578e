//! Static token-to-actor resolver for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{Actor, DomainError, ErrorCode};
use crate::ports::ActorResolver;

/// Resolver backed by a fixed token table.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned.
pub struct StaticActorResolver {
    tokens: RwLock<HashMap<String, Actor>>,
}

impl StaticActorResolver {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a token for an actor.
    pub fn with_token(self, token: impl Into<String>, actor: Actor) -> Self {
        self.tokens
            .write()
            .expect("StaticActorResolver: lock poisoned")
            .insert(token.into(), actor);
        self
    }
}

impl Default for StaticActorResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActorResolver for StaticActorResolver {
    async fn resolve(&self, token: &str) -> Result<Actor, DomainError> {
        self.tokens
            .read()
            .expect("StaticActorResolver: lock poisoned")
            .get(token)
            .cloned()
            .ok_or_else(|| DomainError::new(ErrorCode::Unauthorized, "Invalid token"))
    }
}
