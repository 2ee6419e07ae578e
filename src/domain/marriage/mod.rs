//! Marriage aggregate.

#[allow(clippy::module_inception)]
mod marriage;

pub use marriage::{Marriage, MarriageStatus};
