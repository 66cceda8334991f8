//! Storage layer
//!
//! SQLite (embedded) as the durable store; Redis or DashMap (in-memory)
//! for the listing cache, selected by configuration.

pub mod db;
pub mod memory;
pub mod redis;

pub use db::Database;
pub use memory::MemoryCache;
pub use redis::RedisCache;
