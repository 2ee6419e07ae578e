//! Family resolution handlers.

mod resolve_family;
mod resolve_family_tree;
mod resolver;

pub use resolve_family::{FamilyView, ResolveFamilyHandler, ResolveFamilyQuery};
pub use resolve_family_tree::{ResolveFamilyTreeHandler, ResolveFamilyTreeQuery};
pub use resolver::{FamilyResolver, ResolverOptions};
