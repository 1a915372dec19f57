//! The five entity schemas managed by Depot.
//!
//! Each is a plain field struct plus a typed change set; all CRUD behaviour
//! lives in the store, not here.

mod people;
mod station;
mod vehicle;

pub use people::{
  DeliveryStaff, DeliveryStaffChanges, Receiver, ReceiverChanges, Sender,
  SenderChanges,
};
pub use station::{Station, StationChanges};
pub use vehicle::{Vehicle, VehicleChanges};
