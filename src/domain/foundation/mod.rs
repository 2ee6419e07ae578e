//! Foundation types shared across the domain layer.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{Actor, Permission, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{FamilyId, MarriageId, MemberId, MemberKey, MemberRef, UserId};
pub use timestamp::Timestamp;
