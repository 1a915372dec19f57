//! Core types and trait definitions for the Depot resource store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement [`store::ResourceStore`]; the request layer talks to
//! that trait and never to a concrete backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod entities;
pub mod entity;
pub mod error;
pub mod page;
pub mod record;
pub mod store;

pub use error::{Error, Result};
