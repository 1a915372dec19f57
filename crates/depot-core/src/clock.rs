//! Time source for record timestamps.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Supplies `created_at` / `updated_at` values to a store.
///
/// Stores hold an `Arc<dyn Clock>` so tests can substitute a deterministic
/// source.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A deterministic clock that advances by a fixed step on every reading.
///
/// Lets tests assert that `updated_at` strictly advances without sleeping.
#[derive(Debug)]
pub struct SteppingClock {
  next: Mutex<DateTime<Utc>>,
  step: Duration,
}

impl SteppingClock {
  pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
    Self { next: Mutex::new(start), step }
  }
}

impl Default for SteppingClock {
  fn default() -> Self { Self::new(DateTime::default(), Duration::seconds(1)) }
}

impl Clock for SteppingClock {
  fn now(&self) -> DateTime<Utc> {
    let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
    let now = *next;
    *next = now + self.step;
    now
  }
}
