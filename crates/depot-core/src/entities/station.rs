//! Stations: depots and hand-over points, keyed on `name`.

use serde::{Deserialize, Serialize};

use crate::entity::{Changeset, Entity, FieldSpec, merge, nullable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
  pub name:     String,
  #[serde(default)]
  pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StationChanges {
  #[serde(default)]
  pub name:     Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub location: Option<Option<String>>,
}

impl Changeset for StationChanges {
  fn is_empty(&self) -> bool { self.name.is_none() && self.location.is_none() }
}

impl Entity for Station {
  type Changes = StationChanges;

  const LABEL: &'static str = "Station";
  const PATH: &'static str = "stations";
  const TABLE: &'static str = "stations";
  const FIELDS: &'static [FieldSpec] =
    &[FieldSpec::required("name"), FieldSpec::optional("location")];
  const UNIQUE_FIELD: &'static str = "name";

  fn unique_key(&self) -> &str { &self.name }

  fn apply(&mut self, changes: StationChanges) {
    merge(&mut self.name, changes.name);
    merge(&mut self.location, changes.location);
  }
}
