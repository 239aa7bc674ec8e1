// Cache layer: the shared upstream quota record and the per-entity
// freshness view over the persistent store.

pub mod freshness;
pub mod keys;
pub mod models;
pub mod operations;

pub use freshness::{Freshness, FreshnessCache, RefreshGuard};
pub use models::Quota;
pub use operations::{MemoryQuotaStore, QuotaStore, RedisQuotaStore};
