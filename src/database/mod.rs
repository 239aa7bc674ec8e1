// Persistence layer
// The store contract plus its Postgres and in-memory backends.

pub mod memory;
pub mod pg;
pub mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{Entity, EntityMeta, EntityStore};
