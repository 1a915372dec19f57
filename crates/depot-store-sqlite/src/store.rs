//! [`SqliteStore`] — the SQLite implementation of [`ResourceStore`].

use std::{marker::PhantomData, path::Path, sync::Arc};

use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};

use depot_core::{
  clock::{Clock, SystemClock},
  entity::{Entity, NewRecord, RecordChanges},
  page::ListQuery,
  record::Record,
  store::ResourceStore,
};

use crate::{
  Error, Result,
  encode::{RawRecord, decode_id, encode_id, encode_mutable, encode_new},
  schema::{self, PRAGMAS},
};

// ─── Connections ─────────────────────────────────────────────────────────────

/// Open (or create) a database file and apply connection settings.
pub async fn connect(path: impl AsRef<Path>) -> Result<tokio_rusqlite::Connection> {
  let conn = tokio_rusqlite::Connection::open(path).await?;
  apply_pragmas(&conn).await?;
  Ok(conn)
}

/// Open an in-memory database — useful for testing.
pub async fn connect_in_memory() -> Result<tokio_rusqlite::Connection> {
  let conn = tokio_rusqlite::Connection::open_in_memory().await?;
  apply_pragmas(&conn).await?;
  Ok(conn)
}

async fn apply_pragmas(conn: &tokio_rusqlite::Connection) -> Result<()> {
  conn
    .call(|conn| {
      conn.execute_batch(PRAGMAS)?;
      Ok(())
    })
    .await?;
  Ok(())
}

// ─── Row-level operations ────────────────────────────────────────────────────
//
// These run on the connection thread. Mutations open a transaction so the
// uniqueness check and the write it guards commit together, and read the
// clock there so timestamps follow the order writes are applied in.

fn not_found<T: Entity>(id: u64) -> Error {
  depot_core::Error::NotFound { entity: T::LABEL, id }.into()
}

fn duplicate<T: Entity>(value: &str) -> Error {
  depot_core::Error::DuplicateKey {
    field: T::UNIQUE_FIELD,
    value: value.to_owned(),
  }
  .into()
}

fn fetch<T: Entity>(conn: &rusqlite::Connection, id: u64) -> Result<Record<T>> {
  let Some(raw_id) = encode_id(id) else {
    return Err(not_found::<T>(id));
  };
  conn
    .query_row(&schema::select_by_id::<T>(), [raw_id], RawRecord::from_row::<T>)
    .optional()?
    .ok_or_else(|| not_found::<T>(id))?
    .into_record()
}

fn key_holder<T: Entity>(conn: &rusqlite::Connection, key: &str) -> Result<Option<u64>> {
  conn
    .query_row(&schema::select_key_holder::<T>(), [key], |row| row.get::<_, i64>(0))
    .optional()?
    .map(decode_id::<T>)
    .transpose()
}

fn write_back<T: Entity>(conn: &rusqlite::Connection, record: &Record<T>) -> Result<()> {
  let mut values = encode_mutable(record)?;
  values.push(Value::Integer(encode_id(record.id).ok_or_else(|| not_found::<T>(record.id))?));
  conn.execute(&schema::update::<T>(), params_from_iter(values))?;
  Ok(())
}

fn insert_row<T: Entity>(
  conn: &mut rusqlite::Connection,
  input: NewRecord<T>,
  clock: &dyn Clock,
) -> Result<Record<T>> {
  let tx = conn.transaction()?;
  // The real id is assigned by SQLite inside the insert.
  let mut record = Record::create(0, input, clock.now())?;
  if key_holder::<T>(&tx, record.unique_key())?.is_some() {
    return Err(duplicate::<T>(record.unique_key()));
  }
  tx.execute(&schema::insert::<T>(), params_from_iter(encode_new(&record)?))?;
  record.id = decode_id::<T>(tx.last_insert_rowid())?;
  tx.commit()?;
  Ok(record)
}

fn update_row<T: Entity>(
  conn: &mut rusqlite::Connection,
  id: u64,
  changes: RecordChanges<T::Changes>,
  clock: &dyn Clock,
) -> Result<Record<T>> {
  let tx = conn.transaction()?;
  let current = fetch::<T>(&tx, id)?;
  if changes.is_empty() {
    return Ok(current);
  }

  let next = current.merged(changes, clock.now())?;
  if next.unique_key() != current.unique_key()
    && key_holder::<T>(&tx, next.unique_key())?.is_some_and(|holder| holder != id)
  {
    return Err(duplicate::<T>(next.unique_key()));
  }
  write_back(&tx, &next)?;
  tx.commit()?;
  Ok(next)
}

fn set_active_row<T: Entity>(
  conn: &mut rusqlite::Connection,
  id: u64,
  active: bool,
  clock: &dyn Clock,
) -> Result<Record<T>> {
  let tx = conn.transaction()?;
  let mut record = fetch::<T>(&tx, id)?;
  record.set_active(active, clock.now());
  write_back(&tx, &record)?;
  tx.commit()?;
  Ok(record)
}

fn list_rows<T: Entity>(conn: &rusqlite::Connection, query: ListQuery) -> Result<Vec<Record<T>>> {
  let limit = i64::try_from(query.page.limit).unwrap_or(i64::MAX);
  let offset = i64::try_from(query.page.skip).unwrap_or(i64::MAX);

  let mut params = vec![Value::Integer(limit), Value::Integer(offset)];
  if let Some(active) = query.is_active {
    params.push(Value::Integer(i64::from(active)));
  }

  let mut stmt = conn.prepare(&schema::list::<T>(query.is_active.is_some()))?;
  let raws = stmt
    .query_map(params_from_iter(params), RawRecord::from_row::<T>)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawRecord::into_record::<T>).collect()
}

fn delete_row<T: Entity>(conn: &rusqlite::Connection, id: u64) -> Result<()> {
  let raw_id = encode_id(id).ok_or_else(|| not_found::<T>(id))?;
  match conn.execute(&schema::delete::<T>(), [raw_id])? {
    0 => Err(not_found::<T>(id)),
    _ => Ok(()),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// One Depot collection backed by one SQLite table.
///
/// Cloning is cheap — the inner connection is reference-counted.
pub struct SqliteStore<T> {
  conn:   tokio_rusqlite::Connection,
  clock:  Arc<dyn Clock>,
  entity: PhantomData<fn() -> T>,
}

impl<T: Entity> SqliteStore<T> {
  /// Open (or create) a database file holding only this collection.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::attach(connect(path).await?).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::attach(connect_in_memory().await?).await
  }

  /// Use an existing connection, creating this collection's table if it
  /// does not exist yet.
  pub async fn attach(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let ddl = schema::create_table::<T>();
    conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;

    tracing::debug!(table = T::TABLE, "attached sqlite collection");
    Ok(Self {
      conn,
      clock: Arc::new(SystemClock),
      entity: PhantomData,
    })
  }

  /// Replace the timestamp source.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }
}

impl<T> Clone for SqliteStore<T> {
  fn clone(&self) -> Self {
    Self {
      conn:   self.conn.clone(),
      clock:  Arc::clone(&self.clock),
      entity: PhantomData,
    }
  }
}

// ─── ResourceStore impl ──────────────────────────────────────────────────────

impl<T: Entity> ResourceStore<T> for SqliteStore<T> {
  type Error = Error;

  async fn create(&self, input: NewRecord<T>) -> Result<Record<T>> {
    let clock = Arc::clone(&self.clock);
    let record = self
      .conn
      .call(move |conn| Ok(insert_row::<T>(conn, input, clock.as_ref())))
      .await??;

    tracing::debug!(table = T::TABLE, id = record.id, "created record");
    Ok(record)
  }

  async fn get(&self, id: u64) -> Result<Record<T>> {
    self.conn.call(move |conn| Ok(fetch::<T>(conn, id))).await?
  }

  async fn list(&self, query: ListQuery) -> Result<Vec<Record<T>>> {
    self.conn.call(move |conn| Ok(list_rows::<T>(conn, query))).await?
  }

  async fn update(&self, id: u64, changes: RecordChanges<T::Changes>) -> Result<Record<T>> {
    let clock = Arc::clone(&self.clock);
    let record = self
      .conn
      .call(move |conn| Ok(update_row::<T>(conn, id, changes, clock.as_ref())))
      .await??;

    tracing::debug!(table = T::TABLE, id, "updated record");
    Ok(record)
  }

  async fn set_active(&self, id: u64, active: bool) -> Result<Record<T>> {
    let clock = Arc::clone(&self.clock);
    let record = self
      .conn
      .call(move |conn| Ok(set_active_row::<T>(conn, id, active, clock.as_ref())))
      .await??;

    tracing::debug!(table = T::TABLE, id, active, "set active flag");
    Ok(record)
  }

  async fn delete(&self, id: u64) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(delete_row::<T>(conn, id)))
      .await??;

    tracing::debug!(table = T::TABLE, id, "deleted record");
    Ok(())
  }
}
