pub mod memory;
pub mod postgres;
pub mod trait_def;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use trait_def::{StoreError, StoreResult, VisitorStore};
