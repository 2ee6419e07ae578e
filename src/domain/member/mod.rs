//! Member aggregate and its value objects.

mod errors;
mod events;
#[allow(clippy::module_inception)]
mod member;
mod name;

pub use errors::MemberError;
pub use events::{MemberCreated, MemberEvent};
pub use member::{
    Biodata, FamilyLinks, Gender, LifeStatus, Location, MaritalStatus, Member, MemberProfile,
};
pub use name::{clean, PersonName};
