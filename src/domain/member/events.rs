//! Domain events emitted by the member engine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FamilyId, MarriageId, MemberId, MemberKey};

/// Payload for a freshly created member.
///
/// Consumed by the account auto-provisioner and any other downstream
/// listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCreated {
    pub key: MemberKey,
    pub member_id: MemberId,
    pub family_id: FamilyId,
    pub full_name: String,
}

/// Events published on the member write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEvent {
    /// A new member record was inserted.
    Created(MemberCreated),
    /// An Active marriage now links the two members.
    SpousesLinked {
        marriage: MarriageId,
        husband: MemberKey,
        wife: MemberKey,
    },
    /// An Active marriage was transitioned to a terminal state.
    MarriageDissolved { marriage: MarriageId },
}

impl MemberEvent {
    /// Stable event type tag for routing and logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            MemberEvent::Created(_) => "member.created.v1",
            MemberEvent::SpousesLinked { .. } => "member.spouses_linked.v1",
            MemberEvent::MarriageDissolved { .. } => "member.marriage_dissolved.v1",
        }
    }
}
