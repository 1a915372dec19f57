//! The [`Entity`] trait — the schema half of a resource collection.
//!
//! An entity type describes the user-editable fields of one kind of record
//! (a sender, a vehicle, ...). Identity, timestamps and the active flag are
//! owned by the store and live on [`Record`](crate::record::Record), never on
//! the entity itself.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::Result;

// ─── Schema metadata ─────────────────────────────────────────────────────────

/// One named attribute of an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name:     &'static str,
  /// Required fields must be present on create and can never be cleared.
  pub required: bool,
}

impl FieldSpec {
  pub const fn required(name: &'static str) -> Self {
    Self { name, required: true }
  }

  pub const fn optional(name: &'static str) -> Self {
    Self { name, required: false }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// A typed partial update for one entity kind.
///
/// Every attribute is wrapped so that "absent" is distinguishable from
/// "present": required attributes use `Option<T>`, optional attributes use
/// `Option<Option<T>>` where `Some(None)` clears the value.
pub trait Changeset:
  fmt::Debug + Default + DeserializeOwned + Send + Sync + 'static
{
  /// `true` if no attribute is supplied.
  fn is_empty(&self) -> bool;
}

/// The schema of one kind of stored record.
pub trait Entity:
  fmt::Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
  type Changes: Changeset;

  /// Human-readable singular name, e.g. `"Delivery staff"`.
  const LABEL: &'static str;
  /// URL path segment of the collection, e.g. `"delivery-staffs"`.
  const PATH: &'static str;
  /// Storage table name, e.g. `"delivery_staffs"`.
  const TABLE: &'static str;
  /// All schema fields in declaration order.
  const FIELDS: &'static [FieldSpec];
  /// The field whose value must be unique among live records.
  const UNIQUE_FIELD: &'static str;

  /// The current value of [`Self::UNIQUE_FIELD`].
  fn unique_key(&self) -> &str;

  /// Overwrite every attribute supplied in `changes`.
  fn apply(&mut self, changes: Self::Changes);

  /// Canonicalise attribute values, run before [`Self::validate`] so the
  /// stored form and the uniqueness key agree.
  fn normalize(&mut self) {}

  /// Field-level validation, run on create and on the merged result of an
  /// update before anything is stored.
  fn validate(&self) -> Result<()> { Ok(()) }
}

// ─── Payload envelopes ───────────────────────────────────────────────────────

fn active_by_default() -> bool { true }

/// Input to [`ResourceStore::create`](crate::store::ResourceStore::create):
/// the entity's fields plus an optional initial `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord<T> {
  #[serde(flatten)]
  pub fields:    T,
  #[serde(default = "active_by_default")]
  pub is_active: bool,
}

impl<T> NewRecord<T> {
  pub fn new(fields: T) -> Self {
    Self { fields, is_active: true }
  }
}

/// Input to [`ResourceStore::update`](crate::store::ResourceStore::update).
#[derive(Debug, Default, Deserialize)]
#[serde(bound = "C: Changeset")]
pub struct RecordChanges<C> {
  #[serde(flatten)]
  pub fields:    C,
  #[serde(default)]
  pub is_active: Option<bool>,
}

impl<C: Changeset> RecordChanges<C> {
  pub fn fields(fields: C) -> Self {
    Self { fields, is_active: None }
  }

  pub fn is_empty(&self) -> bool {
    self.is_active.is_none() && self.fields.is_empty()
  }
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// Deserialize a nullable attribute of a change set.
///
/// Used with `#[serde(default, deserialize_with = "...")]`: a missing key
/// stays `None` via the default, an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Overwrite `slot` if the attribute was supplied.
pub fn merge<T>(slot: &mut T, change: Option<T>) {
  if let Some(value) = change {
    *slot = value;
  }
}
