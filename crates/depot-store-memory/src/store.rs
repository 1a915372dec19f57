//! [`MemoryStore`] — the in-memory implementation of [`ResourceStore`].

use std::{
  collections::{BTreeMap, HashMap},
  sync::Arc,
};

use depot_core::{
  Error, Result,
  clock::{Clock, SystemClock},
  entity::{Entity, NewRecord, RecordChanges},
  page::ListQuery,
  record::Record,
  store::ResourceStore,
};
use tokio::sync::RwLock;

// ─── Collection state ────────────────────────────────────────────────────────

/// Everything one collection owns. Only ever touched under the store's lock,
/// so `records` and `keys` always move together.
struct Collection<T> {
  /// Highest id ever handed out; ids are never derived from `records.len()`.
  last_id: u64,
  /// Ascending-id iteration doubles as insertion order.
  records: BTreeMap<u64, Record<T>>,
  /// Unique-field value → owning id.
  keys:    HashMap<String, u64>,
}

impl<T: Entity> Collection<T> {
  fn new() -> Self {
    Self {
      last_id: 0,
      records: BTreeMap::new(),
      keys:    HashMap::new(),
    }
  }

  fn get(&self, id: u64) -> Result<&Record<T>> {
    self.records.get(&id).ok_or(Error::NotFound { entity: T::LABEL, id })
  }

  fn get_mut(&mut self, id: u64) -> Result<&mut Record<T>> {
    self
      .records
      .get_mut(&id)
      .ok_or(Error::NotFound { entity: T::LABEL, id })
  }

  /// Fail if `key` is held by any record other than `owner`.
  fn ensure_free(&self, key: &str, owner: Option<u64>) -> Result<()> {
    match self.keys.get(key) {
      Some(&holder) if Some(holder) != owner => Err(Error::DuplicateKey {
        field: T::UNIQUE_FIELD,
        value: key.to_owned(),
      }),
      _ => Ok(()),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A resource collection held in process memory.
///
/// Cloning is cheap — clones share the same collection.
pub struct MemoryStore<T> {
  inner: Arc<RwLock<Collection<T>>>,
  clock: Arc<dyn Clock>,
}

impl<T: Entity> MemoryStore<T> {
  pub fn new() -> Self { Self::with_clock(Arc::new(SystemClock)) }

  /// Create an empty store that stamps records with `clock`.
  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self {
      inner: Arc::new(RwLock::new(Collection::new())),
      clock,
    }
  }

  /// Number of live records.
  pub async fn len(&self) -> usize { self.inner.read().await.records.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

impl<T: Entity> Default for MemoryStore<T> {
  fn default() -> Self { Self::new() }
}

impl<T> Clone for MemoryStore<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      clock: Arc::clone(&self.clock),
    }
  }
}

// ─── ResourceStore impl ──────────────────────────────────────────────────────

impl<T: Entity> ResourceStore<T> for MemoryStore<T> {
  type Error = Error;

  async fn create(&self, input: NewRecord<T>) -> Result<Record<T>> {
    let mut collection = self.inner.write().await;
    // Stamped under the lock so application order and timestamp order agree.
    let now = self.clock.now();

    let id = collection.last_id + 1;
    let record = Record::create(id, input, now)?;
    collection.ensure_free(record.unique_key(), None)?;

    collection.last_id = id;
    collection.keys.insert(record.unique_key().to_owned(), id);
    collection.records.insert(id, record.clone());

    tracing::debug!(collection = T::TABLE, id, "created record");
    Ok(record)
  }

  async fn get(&self, id: u64) -> Result<Record<T>> {
    self.inner.read().await.get(id).cloned()
  }

  async fn list(&self, query: ListQuery) -> Result<Vec<Record<T>>> {
    let collection = self.inner.read().await;
    let matching = collection
      .records
      .values()
      .filter(|r| query.matches(r.is_active));
    Ok(query.page.apply(matching).cloned().collect())
  }

  async fn update(&self, id: u64, changes: RecordChanges<T::Changes>) -> Result<Record<T>> {
    let mut collection = self.inner.write().await;
    let now = self.clock.now();

    let current = collection.get(id)?;
    if changes.is_empty() {
      return Ok(current.clone());
    }

    let next = current.merged(changes, now)?;
    let old_key = current.unique_key().to_owned();
    if next.unique_key() != old_key {
      collection.ensure_free(next.unique_key(), Some(id))?;
      collection.keys.remove(&old_key);
      collection.keys.insert(next.unique_key().to_owned(), id);
    }
    collection.records.insert(id, next.clone());

    tracing::debug!(collection = T::TABLE, id, "updated record");
    Ok(next)
  }

  async fn set_active(&self, id: u64, active: bool) -> Result<Record<T>> {
    let mut collection = self.inner.write().await;
    let now = self.clock.now();

    let record = collection.get_mut(id)?;
    record.set_active(active, now);

    tracing::debug!(collection = T::TABLE, id, active, "set active flag");
    Ok(record.clone())
  }

  async fn delete(&self, id: u64) -> Result<()> {
    let mut collection = self.inner.write().await;

    let record = collection
      .records
      .remove(&id)
      .ok_or(Error::NotFound { entity: T::LABEL, id })?;
    collection.keys.remove(record.unique_key());

    tracing::debug!(collection = T::TABLE, id, "deleted record");
    Ok(())
  }
}
