pub mod memory;
pub mod postgres;
pub mod reader;
pub mod redis;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};
pub use reader::{CandidateQuery, ItemOrdering, StoreReader};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
