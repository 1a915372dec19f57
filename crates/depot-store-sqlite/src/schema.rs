//! SQL schema for the Depot SQLite store.
//!
//! Each entity kind gets one table generated from its [`FieldSpec`] list:
//! one TEXT column per field, `NOT NULL` when required, and a `UNIQUE`
//! constraint on the uniqueness key. `AUTOINCREMENT` guarantees that SQLite
//! never hands out a rowid twice, even after deletes.

use depot_core::entity::{Entity, FieldSpec};

/// Connection-wide settings, executed once when a connection is opened.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Quote an identifier for use in SQL. Entity field names are compile-time
/// constants, but `type` (vehicles) is a keyword in some dialects.
pub fn ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

fn column_ddl<T: Entity>(field: &FieldSpec) -> String {
  let mut col = format!("{} TEXT", ident(field.name));
  if field.required {
    col.push_str(" NOT NULL");
  }
  if field.name == T::UNIQUE_FIELD {
    col.push_str(" UNIQUE");
  }
  col
}

/// `CREATE TABLE IF NOT EXISTS` for `T`; idempotent.
pub fn create_table<T: Entity>() -> String {
  let mut columns = vec!["id         INTEGER PRIMARY KEY AUTOINCREMENT".to_owned()];
  columns.extend(T::FIELDS.iter().map(column_ddl::<T>));
  columns.push("is_active  INTEGER NOT NULL DEFAULT 1".to_owned());
  columns.push("created_at TEXT    NOT NULL".to_owned());
  columns.push("updated_at TEXT    NOT NULL".to_owned());

  format!(
    "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n\
     CREATE INDEX IF NOT EXISTS {} ON {}(is_active);",
    ident(T::TABLE),
    columns.join(",\n    "),
    ident(&format!("{}_active_idx", T::TABLE)),
    ident(T::TABLE),
  )
}

/// Column list in the order rows are read back: id, fields, envelope.
pub fn select_columns<T: Entity>() -> String {
  let mut cols = vec!["id".to_owned()];
  cols.extend(T::FIELDS.iter().map(|f| ident(f.name)));
  cols.extend(["is_active", "created_at", "updated_at"].map(str::to_owned));
  cols.join(", ")
}

pub fn select_by_id<T: Entity>() -> String {
  format!("SELECT {} FROM {} WHERE id = ?1", select_columns::<T>(), ident(T::TABLE))
}

pub fn select_key_holder<T: Entity>() -> String {
  format!(
    "SELECT id FROM {} WHERE {} = ?1",
    ident(T::TABLE),
    ident(T::UNIQUE_FIELD)
  )
}

/// Placeholders bind fields in schema order, then is_active, created_at,
/// updated_at.
pub fn insert<T: Entity>() -> String {
  let names: Vec<String> = T::FIELDS
    .iter()
    .map(|f| ident(f.name))
    .chain(["is_active", "created_at", "updated_at"].map(str::to_owned))
    .collect();
  let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    ident(T::TABLE),
    names.join(", "),
    placeholders.join(", ")
  )
}

/// Placeholders bind fields in schema order, then is_active, updated_at,
/// and finally the id.
pub fn update<T: Entity>() -> String {
  let mut assignments: Vec<String> = T::FIELDS
    .iter()
    .enumerate()
    .map(|(i, f)| format!("{} = ?{}", ident(f.name), i + 1))
    .collect();
  let n = T::FIELDS.len();
  assignments.push(format!("is_active = ?{}", n + 1));
  assignments.push(format!("updated_at = ?{}", n + 2));
  format!(
    "UPDATE {} SET {} WHERE id = ?{}",
    ident(T::TABLE),
    assignments.join(", "),
    n + 3
  )
}

pub fn delete<T: Entity>() -> String {
  format!("DELETE FROM {} WHERE id = ?1", ident(T::TABLE))
}

/// `?1` = limit, `?2` = offset, `?3` = optional is_active filter.
pub fn list<T: Entity>(filtered: bool) -> String {
  let filter = if filtered { " WHERE is_active = ?3" } else { "" };
  format!(
    "SELECT {} FROM {}{} ORDER BY id LIMIT ?1 OFFSET ?2",
    select_columns::<T>(),
    ident(T::TABLE),
    filter
  )
}
