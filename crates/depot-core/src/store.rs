//! The `ResourceStore` trait.
//!
//! The trait is implemented by storage backends (`depot-store-memory`,
//! `depot-store-sqlite`). The request layer (`depot-api`) depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  entity::{Entity, NewRecord, RecordChanges},
  page::ListQuery,
  record::Record,
};

/// An identity-keyed collection of [`Record<T>`]s.
///
/// Contract shared by every backend:
///
/// - ids start at 1, increase monotonically and are never reused, even after
///   a delete;
/// - the value of [`Entity::UNIQUE_FIELD`] is unique among live records;
/// - a failed operation leaves the collection unchanged;
/// - mutations are serialised per collection, so the uniqueness check and
///   the write it guards are atomic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ResourceStore<T: Entity>: Send + Sync {
  /// Backend error; must reduce to the core taxonomy so callers can map
  /// `NotFound` / `DuplicateKey` / `InvalidArgument` uniformly.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Validate and persist a new record. Fails with `DuplicateKey` if a live
  /// record already holds the same unique value.
  fn create(
    &self,
    input: NewRecord<T>,
  ) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Fails with `NotFound` if absent.
  fn get(&self, id: u64) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_;

  /// Records in ascending id order, filtered on `is_active` and then paged.
  fn list(
    &self,
    query: ListQuery,
  ) -> impl Future<Output = Result<Vec<Record<T>>, Self::Error>> + Send + '_;

  /// Merge the supplied attributes into an existing record.
  ///
  /// Uniqueness and field validation run against the merged result before
  /// anything is written. An empty change set returns the record as-is.
  fn update(
    &self,
    id: u64,
    changes: RecordChanges<T::Changes>,
  ) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_;

  /// Set `is_active` and refresh `updated_at`. Idempotent.
  fn set_active(
    &self,
    id: u64,
    active: bool,
  ) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_;

  fn activate(&self, id: u64) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_ {
    self.set_active(id, true)
  }

  fn deactivate(&self, id: u64) -> impl Future<Output = Result<Record<T>, Self::Error>> + Send + '_ {
    self.set_active(id, false)
  }

  /// Remove a record permanently. Its unique value becomes free; its id does
  /// not.
  fn delete(&self, id: u64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
