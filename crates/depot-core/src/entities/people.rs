//! People: senders, receivers and delivery staff.
//!
//! All three share one schema (`name`, `email`, `phone`, `address`) keyed on
//! `email`. They stay distinct types so that each gets its own collection.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail as _;

use crate::{
  Error, Result,
  entity::{Changeset, Entity, FieldSpec, merge, nullable},
};

const PERSON_FIELDS: &[FieldSpec] = &[
  FieldSpec::required("name"),
  FieldSpec::required("email"),
  FieldSpec::optional("phone"),
  FieldSpec::optional("address"),
];

fn validate_email(email: &str) -> Result<()> {
  if email.validate_email() {
    Ok(())
  } else {
    Err(Error::invalid("email", format!("{email:?} is not a valid email address")))
  }
}

/// Lowercase the domain part; the local part is case-sensitive.
fn normalize_email(email: &mut String) {
  if let Some(at) = email.rfind('@') {
    let domain = email[at + 1..].to_lowercase();
    email.truncate(at + 1);
    email.push_str(&domain);
  }
}

macro_rules! person_entity {
  (
    $(#[$meta:meta])*
    $name:ident, $changes:ident,
    label: $label:literal,
    path: $path:literal,
    table: $table:literal $(,)?
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct $name {
      pub name:    String,
      pub email:   String,
      #[serde(default)]
      pub phone:   Option<String>,
      #[serde(default)]
      pub address: Option<String>,
    }

    #[doc = concat!("Partial update for [`", stringify!($name), "`].")]
    #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
    pub struct $changes {
      #[serde(default)]
      pub name:    Option<String>,
      #[serde(default)]
      pub email:   Option<String>,
      #[serde(default, deserialize_with = "nullable")]
      pub phone:   Option<Option<String>>,
      #[serde(default, deserialize_with = "nullable")]
      pub address: Option<Option<String>>,
    }

    impl Changeset for $changes {
      fn is_empty(&self) -> bool {
        self.name.is_none()
          && self.email.is_none()
          && self.phone.is_none()
          && self.address.is_none()
      }
    }

    impl Entity for $name {
      type Changes = $changes;

      const LABEL: &'static str = $label;
      const PATH: &'static str = $path;
      const TABLE: &'static str = $table;
      const FIELDS: &'static [FieldSpec] = PERSON_FIELDS;
      const UNIQUE_FIELD: &'static str = "email";

      fn unique_key(&self) -> &str { &self.email }

      fn apply(&mut self, changes: $changes) {
        merge(&mut self.name, changes.name);
        merge(&mut self.email, changes.email);
        merge(&mut self.phone, changes.phone);
        merge(&mut self.address, changes.address);
      }

      fn normalize(&mut self) { normalize_email(&mut self.email) }

      fn validate(&self) -> Result<()> { validate_email(&self.email) }
    }
  };
}

person_entity! {
  /// A party that hands parcels over for delivery.
  Sender, SenderChanges,
  label: "Sender",
  path: "senders",
  table: "senders",
}

person_entity! {
  /// A party that parcels are delivered to.
  Receiver, ReceiverChanges,
  label: "Receiver",
  path: "receivers",
  table: "receivers",
}

person_entity! {
  /// A courier or driver employed to carry parcels.
  DeliveryStaff, DeliveryStaffChanges,
  label: "Delivery staff",
  path: "delivery-staffs",
  table: "delivery_staffs",
}
