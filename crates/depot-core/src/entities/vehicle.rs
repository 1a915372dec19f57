//! Vehicles, keyed on `license_plate`.

use serde::{Deserialize, Serialize};

use crate::entity::{Changeset, Entity, FieldSpec, merge, nullable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
  pub license_plate: String,
  /// Body type, e.g. "van" or "motorbike".
  #[serde(default, rename = "type")]
  pub kind:          Option<String>,
  #[serde(default)]
  pub brand:         Option<String>,
  #[serde(default)]
  pub color:         Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VehicleChanges {
  #[serde(default)]
  pub license_plate: Option<String>,
  #[serde(default, rename = "type", deserialize_with = "nullable")]
  pub kind:          Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub brand:         Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub color:         Option<Option<String>>,
}

impl Changeset for VehicleChanges {
  fn is_empty(&self) -> bool {
    self.license_plate.is_none()
      && self.kind.is_none()
      && self.brand.is_none()
      && self.color.is_none()
  }
}

impl Entity for Vehicle {
  type Changes = VehicleChanges;

  const LABEL: &'static str = "Vehicle";
  const PATH: &'static str = "vehicles";
  const TABLE: &'static str = "vehicles";
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::required("license_plate"),
    FieldSpec::optional("type"),
    FieldSpec::optional("brand"),
    FieldSpec::optional("color"),
  ];
  const UNIQUE_FIELD: &'static str = "license_plate";

  fn unique_key(&self) -> &str { &self.license_plate }

  fn apply(&mut self, changes: VehicleChanges) {
    merge(&mut self.license_plate, changes.license_plate);
    merge(&mut self.kind, changes.kind);
    merge(&mut self.brand, changes.brand);
    merge(&mut self.color, changes.color);
  }
}
