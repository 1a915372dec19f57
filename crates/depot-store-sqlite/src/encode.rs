//! Encoding and decoding helpers between records and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings. Entity fields go through their
//! serde representation: each field in [`Entity::FIELDS`] is looked up by its
//! wire name and bound as a SQLite value, so the table layout always matches
//! what the API serialises.

use chrono::{DateTime, Utc};
use depot_core::{entity::Entity, record::Record};
use rusqlite::types::Value;
use serde_json::{Map, Value as Json};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Ids ─────────────────────────────────────────────────────────────────────

/// SQLite rowids are signed; ids above `i64::MAX` cannot exist.
pub fn encode_id(id: u64) -> Option<i64> { i64::try_from(id).ok() }

pub fn decode_id<T: Entity>(raw: i64) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::Corrupt {
    table:  T::TABLE,
    reason: format!("negative id {raw}"),
  })
}

// ─── Fields ──────────────────────────────────────────────────────────────────

fn json_to_sql(value: Json) -> Value {
  match value {
    Json::Null => Value::Null,
    Json::Bool(b) => Value::Integer(i64::from(b)),
    Json::Number(n) => match n.as_i64() {
      Some(i) => Value::Integer(i),
      None => n.as_f64().map_or(Value::Null, Value::Real),
    },
    Json::String(s) => Value::Text(s),
    other => Value::Text(other.to_string()),
  }
}

fn sql_to_json<T: Entity>(value: Value) -> Result<Json> {
  match value {
    Value::Null => Ok(Json::Null),
    Value::Integer(i) => Ok(Json::from(i)),
    Value::Real(f) => Ok(Json::from(f)),
    Value::Text(s) => Ok(Json::String(s)),
    Value::Blob(_) => Err(Error::Corrupt {
      table:  T::TABLE,
      reason: "unexpected blob column".to_owned(),
    }),
  }
}

/// The entity's fields as SQLite values, in [`Entity::FIELDS`] order.
pub fn encode_fields<T: Entity>(fields: &T) -> Result<Vec<Value>> {
  let Json::Object(mut map) = serde_json::to_value(fields)? else {
    return Err(Error::Corrupt {
      table:  T::TABLE,
      reason: "entity did not serialise to an object".to_owned(),
    });
  };
  Ok(
    T::FIELDS
      .iter()
      .map(|f| json_to_sql(map.remove(f.name).unwrap_or(Json::Null)))
      .collect(),
  )
}

/// Everything [`SqliteStore::update`](crate::SqliteStore) writes back:
/// fields, then `is_active`, then `updated_at`.
pub fn encode_mutable<T: Entity>(record: &Record<T>) -> Result<Vec<Value>> {
  let mut values = encode_fields(&record.fields)?;
  values.push(Value::Integer(i64::from(record.is_active)));
  values.push(Value::Text(encode_dt(record.updated_at)));
  Ok(values)
}

/// Everything an insert binds: fields, `is_active`, `created_at`,
/// `updated_at`.
pub fn encode_new<T: Entity>(record: &Record<T>) -> Result<Vec<Value>> {
  let mut values = encode_fields(&record.fields)?;
  values.push(Value::Integer(i64::from(record.is_active)));
  values.push(Value::Text(encode_dt(record.created_at)));
  values.push(Value::Text(encode_dt(record.updated_at)));
  Ok(values)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from an entity row, in
/// [`select_columns`](crate::schema::select_columns) order.
pub struct RawRecord {
  pub id:         i64,
  pub fields:     Vec<Value>,
  pub is_active:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawRecord {
  pub fn from_row<T: Entity>(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let n = T::FIELDS.len();
    let fields = (1..=n)
      .map(|i| row.get::<_, Value>(i))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Self {
      id: row.get(0)?,
      fields,
      is_active: row.get(n + 1)?,
      created_at: row.get(n + 2)?,
      updated_at: row.get(n + 3)?,
    })
  }

  pub fn into_record<T: Entity>(self) -> Result<Record<T>> {
    let mut map = Map::with_capacity(T::FIELDS.len());
    for (spec, value) in T::FIELDS.iter().zip(self.fields) {
      map.insert(spec.name.to_owned(), sql_to_json::<T>(value)?);
    }

    Ok(Record {
      id:         decode_id::<T>(self.id)?,
      fields:     serde_json::from_value(Json::Object(map))?,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use depot_core::entities::Vehicle;

  use super::*;

  #[test]
  fn fields_follow_schema_order() {
    let v = Vehicle {
      license_plate: "ABC-1".into(),
      kind:          Some("van".into()),
      brand:         None,
      color:         Some("red".into()),
    };
    let values = encode_fields(&v).unwrap();
    assert_eq!(
      values,
      vec![
        Value::Text("ABC-1".into()),
        Value::Text("van".into()),
        Value::Null,
        Value::Text("red".into()),
      ]
    );
  }

  #[test]
  fn datetime_roundtrip() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }
}
