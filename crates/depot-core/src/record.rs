//! [`Record`] — a stored entity with its store-managed envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  entity::{Entity, NewRecord, RecordChanges},
};

/// One stored entity instance.
///
/// `id`, the timestamps and `is_active` are assigned by the store; the
/// schema fields are flattened alongside them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
  pub id:         u64,
  #[serde(flatten)]
  pub fields:     T,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl<T: Entity> Record<T> {
  /// Build a fresh record from validated input.
  pub fn create(id: u64, input: NewRecord<T>, now: DateTime<Utc>) -> Result<Self> {
    let mut fields = input.fields;
    fields.normalize();
    fields.validate()?;
    Ok(Self {
      id,
      fields,
      is_active: input.is_active,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn unique_key(&self) -> &str { self.fields.unique_key() }

  /// Produce the result of applying `changes`, leaving `self` untouched.
  ///
  /// The merged fields are validated; on error nothing has been applied
  /// anywhere.
  pub fn merged(&self, changes: RecordChanges<T::Changes>, now: DateTime<Utc>) -> Result<Self> {
    let mut next = self.clone();
    next.fields.apply(changes.fields);
    next.fields.normalize();
    next.fields.validate()?;
    if let Some(active) = changes.is_active {
      next.is_active = active;
    }
    next.touch(now);
    Ok(next)
  }

  /// Set the active flag and refresh `updated_at`.
  pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
    self.is_active = active;
    self.touch(now);
  }

  /// Refresh `updated_at`, never letting it fall behind `created_at`.
  pub fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now.max(self.created_at);
  }
}
