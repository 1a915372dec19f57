//! SQLite backend for Depot resource collections.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Several collections may share
//! one connection; each owns its own table.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, connect, connect_in_memory};

#[cfg(test)]
mod tests;
