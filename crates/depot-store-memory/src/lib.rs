//! In-memory backend for Depot resource collections.
//!
//! One [`MemoryStore`] per entity kind. State lives for the lifetime of the
//! process; durability is the SQLite backend's job.

mod store;

pub use store::MemoryStore;
