//! Error types for `depot-core`.
//!
//! The store never formats user-facing text; each variant carries the id or
//! field/value the caller needs to build its own message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The operation targeted an id absent from the collection.
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: u64 },

  /// A create or update would give two live records the same key.
  #[error("duplicate {field}: {value:?}")]
  DuplicateKey { field: &'static str, value: String },

  /// Malformed pagination parameters or a field value that fails validation.
  #[error("invalid {field}: {reason}")]
  InvalidArgument { field: &'static str, reason: String },

  /// A durable backend failed underneath the store contract.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
    Self::InvalidArgument { field, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
