pub mod quota;

pub use quota::{MemoryQuotaStore, QuotaStore, RedisQuotaStore};
