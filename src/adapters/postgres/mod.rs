//! PostgreSQL adapters.

mod marriage_store;
mod member_store;

pub use marriage_store::PostgresMarriageStore;
pub use member_store::PostgresMemberStore;
