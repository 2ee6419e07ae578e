//! In-memory event bus for tests and single-process deployments.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::domain::member::MemberEvent;
use crate::ports::EventPublisher;

/// In-memory event bus capturing published events.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned.
pub struct InMemoryEventBus {
    published: Mutex<Vec<MemberEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    /// All published events, in publication order (test helper).
    pub fn published_events(&self) -> Vec<MemberEvent> {
        self.published
            .lock()
            .expect("InMemoryEventBus: lock poisoned")
            .clone()
    }

    /// True when an event with the given type tag was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published_events()
            .iter()
            .any(|e| e.event_type() == event_type)
    }

    /// Clears captured events (test isolation).
    pub fn clear(&self) {
        self.published
            .lock()
            .expect("InMemoryEventBus: lock poisoned")
            .clear();
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: MemberEvent) -> Result<(), DomainError> {
        tracing::debug!(event_type = event.event_type(), "event published");
        self.published
            .lock()
            .expect("InMemoryEventBus: lock poisoned")
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::MarriageId;

    #[tokio::test]
    async fn published_events_are_captured_in_order() {
        let bus = InMemoryEventBus::new();
        bus.publish(MemberEvent::MarriageDissolved {
            marriage: MarriageId::new(),
        })
        .await
        .unwrap();

        assert_eq!(bus.published_events().len(), 1);
        assert!(bus.has_event("member.marriage_dissolved.v1"));
        assert!(!bus.has_event("member.created.v1"));

        bus.clear();
        assert!(bus.published_events().is_empty());
    }
}
