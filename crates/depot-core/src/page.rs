//! Pagination and listing parameters.

use crate::{Error, Result};

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;

/// A validated `skip`/`limit` window.
///
/// Built from signed inputs so that negative values coming off the wire are
/// rejected here rather than silently wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub skip:  usize,
  pub limit: usize,
}

impl Page {
  pub fn new(skip: i64, limit: i64) -> Result<Self> {
    let skip = usize::try_from(skip)
      .map_err(|_| Error::invalid("skip", format!("must be non-negative, got {skip}")))?;
    let limit = usize::try_from(limit)
      .map_err(|_| Error::invalid("limit", format!("must be non-negative, got {limit}")))?;
    Ok(Self { skip, limit })
  }

  /// Apply the window to an already-filtered, ordered sequence.
  pub fn apply<I: IntoIterator>(self, items: I) -> impl Iterator<Item = I::Item> {
    items.into_iter().skip(self.skip).take(self.limit)
  }
}

impl Default for Page {
  fn default() -> Self {
    Self {
      skip:  DEFAULT_SKIP as usize,
      limit: DEFAULT_LIMIT as usize,
    }
  }
}

/// Parameters for [`ResourceStore::list`](crate::store::ResourceStore::list).
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery {
  pub page:      Page,
  /// Restrict to records whose `is_active` equals this value. Applied before
  /// pagination.
  pub is_active: Option<bool>,
}

impl ListQuery {
  pub fn matches(&self, is_active: bool) -> bool {
    self.is_active.is_none_or(|want| want == is_active)
  }
}
