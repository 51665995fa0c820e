pub mod establishment;
pub mod memory;
pub mod pg_store;
pub mod quota;
pub mod repository;
pub mod review;

pub use memory::{InMemoryQuotaCounter, InMemoryStore};
pub use pg_store::PgStore;
pub use quota::RedisQuotaCounter;
pub use repository::{EstablishmentRegistry, QuotaCounter, ReviewRepository};
