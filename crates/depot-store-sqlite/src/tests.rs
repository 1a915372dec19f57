//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use depot_core::{
  clock::{Clock, SteppingClock},
  entities::{Receiver, ReceiverChanges, Station, StationChanges, Vehicle, VehicleChanges},
  entity::{Entity, NewRecord, RecordChanges},
  page::{ListQuery, Page},
  store::ResourceStore,
};

use crate::{Error, SqliteStore, connect_in_memory};

async fn store<T: Entity>() -> SqliteStore<T> {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_clock(Arc::new(SteppingClock::default()))
}

fn core(err: Error) -> depot_core::Error { err.into() }

fn receiver(name: &str, email: &str) -> NewRecord<Receiver> {
  NewRecord::new(Receiver {
    name:    name.into(),
    email:   email.into(),
    phone:   Some("555-0199".into()),
    address: None,
  })
}

fn vehicle(plate: &str) -> NewRecord<Vehicle> {
  NewRecord::new(Vehicle {
    license_plate: plate.into(),
    kind:          Some("truck".into()),
    brand:         Some("Volvo".into()),
    color:         None,
  })
}

fn station(name: &str) -> NewRecord<Station> {
  NewRecord::new(Station { name: name.into(), location: None })
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_roundtrip() {
  let s = store::<Receiver>().await;

  let created = s.create(receiver("R", "r@x.com")).await.unwrap();
  assert_eq!(created.id, 1);
  assert!(created.is_active);
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get(created.id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn vehicle_type_column_roundtrips() {
  let s = store::<Vehicle>().await;
  let created = s.create(vehicle("ABC-1")).await.unwrap();

  let fetched = s.get(created.id).await.unwrap();
  assert_eq!(fetched.fields.kind.as_deref(), Some("truck"));
  assert_eq!(fetched.fields.color, None);
}

#[tokio::test]
async fn duplicate_key_is_rejected() {
  let s = store::<Receiver>().await;
  s.create(receiver("R", "r@x.com")).await.unwrap();

  let err = core(s.create(receiver("R2", "r@x.com")).await.unwrap_err());
  assert!(matches!(
    err,
    depot_core::Error::DuplicateKey { field: "email", ref value } if value == "r@x.com"
  ));
  assert_eq!(s.list(ListQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let s = store::<Station>().await;
  let err = core(s.get(5).await.unwrap_err());
  assert!(matches!(err, depot_core::Error::NotFound { id: 5, .. }));
}

#[tokio::test]
async fn ids_are_never_reused() {
  let s = store::<Receiver>().await;
  s.create(receiver("A", "a@x.com")).await.unwrap();
  s.create(receiver("B", "b@x.com")).await.unwrap();
  s.delete(2).await.unwrap();

  let c = s.create(receiver("C", "c@x.com")).await.unwrap();
  assert_eq!(c.id, 3);
}

#[tokio::test]
async fn deleted_key_becomes_free() {
  let s = store::<Station>().await;
  s.create(station("S1")).await.unwrap();
  s.delete(1).await.unwrap();

  let again = s.create(station("S1")).await.unwrap();
  assert_eq!(again.id, 2);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_pages_and_filters() {
  let s = store::<Station>().await;
  for name in ["S1", "S2", "S3", "S4", "S5"] {
    s.create(station(name)).await.unwrap();
  }
  s.deactivate(2).await.unwrap();

  let active = ListQuery { page: Page::new(1, 2).unwrap(), is_active: Some(true) };
  let ids: Vec<u64> = s.list(active).await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![3, 4]);

  let inactive = ListQuery { is_active: Some(false), ..Default::default() };
  let ids: Vec<u64> = s.list(inactive).await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![2]);

  let past_end = ListQuery { page: Page::new(50, 10).unwrap(), is_active: None };
  assert!(s.list(past_end).await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_filter_on_all_active_is_empty() {
  let s = store::<Station>().await;
  for name in ["S1", "S2", "S3"] {
    s.create(station(name)).await.unwrap();
  }
  let query = ListQuery { is_active: Some(false), ..Default::default() };
  assert!(s.list(query).await.unwrap().is_empty());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn partial_update_preserves_untouched_fields() {
  let s = store::<Station>().await;
  let created = s.create(station("S1")).await.unwrap();

  let changes = RecordChanges::fields(StationChanges {
    location: Some(Some("Zone A".into())),
    ..Default::default()
  });
  let updated = s.update(created.id, changes).await.unwrap();
  assert_eq!(updated.fields.name, "S1");
  assert_eq!(updated.fields.location.as_deref(), Some("Zone A"));
  assert!(updated.updated_at > created.updated_at);

  assert_eq!(s.get(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_to_taken_key_changes_nothing() {
  let s = store::<Vehicle>().await;
  s.create(vehicle("ABC-1")).await.unwrap();
  let second = s.create(vehicle("XYZ-9")).await.unwrap();

  let changes = RecordChanges::fields(VehicleChanges {
    license_plate: Some("ABC-1".into()),
    brand:         Some(None),
    ..Default::default()
  });
  let err = core(s.update(second.id, changes).await.unwrap_err());
  assert!(matches!(err, depot_core::Error::DuplicateKey { field: "license_plate", .. }));
  assert_eq!(s.get(second.id).await.unwrap(), second);
}

#[tokio::test]
async fn update_with_invalid_email_changes_nothing() {
  let s = store::<Receiver>().await;
  let created = s.create(receiver("R", "r@x.com")).await.unwrap();

  let changes = RecordChanges::fields(ReceiverChanges {
    name:  Some("Changed".into()),
    email: Some("broken".into()),
    ..Default::default()
  });
  let err = core(s.update(created.id, changes).await.unwrap_err());
  assert!(matches!(err, depot_core::Error::InvalidArgument { field: "email", .. }));
  assert_eq!(s.get(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn update_null_clears_optional_column() {
  let s = store::<Vehicle>().await;
  let created = s.create(vehicle("ABC-1")).await.unwrap();

  let changes = RecordChanges::fields(VehicleChanges {
    brand: Some(None),
    ..Default::default()
  });
  s.update(created.id, changes).await.unwrap();

  let stored = s.get(created.id).await.unwrap();
  assert_eq!(stored.fields.brand, None);
  assert_eq!(stored.fields.kind.as_deref(), Some("truck"));
}

#[tokio::test]
async fn empty_update_is_a_no_op() {
  let s = store::<Station>().await;
  let created = s.create(station("S1")).await.unwrap();
  let same = s.update(created.id, RecordChanges::default()).await.unwrap();
  assert_eq!(same, created);
}

// ─── Activation / delete ─────────────────────────────────────────────────────

#[tokio::test]
async fn activation_is_idempotent() {
  let s = store::<Receiver>().await;
  let created = s.create(receiver("R", "r@x.com")).await.unwrap();

  let first = s.activate(created.id).await.unwrap();
  let second = s.activate(created.id).await.unwrap();
  assert!(first.is_active && second.is_active);
  assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn deactivate_missing_is_not_found() {
  let s = store::<Receiver>().await;
  let err = core(s.deactivate(9).await.unwrap_err());
  assert!(matches!(err, depot_core::Error::NotFound { id: 9, .. }));
}

#[tokio::test]
async fn delete_missing_is_not_found() {
  let s = store::<Receiver>().await;
  let err = core(s.delete(1).await.unwrap_err());
  assert!(matches!(err, depot_core::Error::NotFound { id: 1, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_mutations_are_stamped_in_apply_order() {
  let s = SqliteStore::<Station>::open_in_memory()
    .await
    .unwrap()
    .with_clock(Arc::new(StallingClock::new(1)));
  let created = s.create(station("S1")).await.unwrap();

  // The deactivate stalls while reading its timestamp; the activate is
  // queued behind it on the connection and must be stamped later.
  let first = tokio::spawn({
    let s = s.clone();
    async move { s.deactivate(created.id).await }
  });
  tokio::time::sleep(Duration::from_millis(50)).await;
  let second = tokio::spawn({
    let s = s.clone();
    async move { s.activate(created.id).await }
  });

  let first = first.await.unwrap().unwrap();
  let second = second.await.unwrap().unwrap();
  assert!(second.updated_at > first.updated_at);

  let stored = s.get(created.id).await.unwrap();
  assert!(stored.is_active);
  assert_eq!(stored.updated_at, second.updated_at);
}

// ─── Shared connection ───────────────────────────────────────────────────────

#[tokio::test]
async fn collections_share_a_connection_independently() {
  let conn = connect_in_memory().await.unwrap();
  let stations = SqliteStore::<Station>::attach(conn.clone()).await.unwrap();
  let vehicles = SqliteStore::<Vehicle>::attach(conn).await.unwrap();

  stations.create(station("S1")).await.unwrap();
  let v = vehicles.create(vehicle("ABC-1")).await.unwrap();

  // Each table has its own id sequence.
  assert_eq!(v.id, 1);
  assert!(vehicles.get(1).await.is_ok());
  assert_eq!(stations.list(ListQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_with_same_key_admit_one() {
  let s = store::<Station>().await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    handles.push(tokio::spawn(async move { s.create(station("hub")).await }));
  }

  let mut ok = 0;
  for h in handles {
    if h.await.unwrap().is_ok() {
      ok += 1;
    }
  }
  assert_eq!(ok, 1);
}

// ─── Clocks ──────────────────────────────────────────────────────────────────

/// Ticks one second per reading and blocks the calling thread on reading
/// number `stall_on`.
struct StallingClock {
  readings: AtomicI64,
  stall_on: i64,
}

impl StallingClock {
  fn new(stall_on: i64) -> Self {
    Self { readings: AtomicI64::new(0), stall_on }
  }
}

impl Clock for StallingClock {
  fn now(&self) -> DateTime<Utc> {
    let n = self.readings.fetch_add(1, Ordering::SeqCst);
    if n == self.stall_on {
      std::thread::sleep(Duration::from_millis(300));
    }
    DateTime::<Utc>::default() + chrono::Duration::seconds(1_000 + n)
  }
}
