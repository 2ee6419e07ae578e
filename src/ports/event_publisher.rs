//! Event publisher port.
//!
//! The member engine announces writes (creation, marriage linking) without
//! knowing who listens. The account auto-provisioner is the main consumer.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::member::MemberEvent;

/// Port for publishing member domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    ///
    /// Delivery is at-least-once; listeners must tolerate duplicates.
    async fn publish(&self, event: MemberEvent) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_publisher_is_object_safe() {
        fn _accepts_dyn(_publisher: &dyn EventPublisher) {}
    }
}
