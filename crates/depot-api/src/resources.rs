//! Generic handlers shared by every collection.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{path}` | Optional `?skip`, `?limit`, `?is_active` |
//! | `POST`   | `/{path}` | Body: entity fields, optional `is_active`; returns 201 |
//! | `GET`    | `/{path}/{id}` | 404 if not found |
//! | `PUT`    | `/{path}/{id}` | Partial body; same as `PATCH` |
//! | `PATCH`  | `/{path}/{id}` | Partial body; `null` clears an optional field |
//! | `DELETE` | `/{path}/{id}` | 204, empty body |
//! | `POST`   | `/{path}/{id}/activate` | Sets `is_active = true` |
//! | `POST`   | `/{path}/{id}/deactivate` | Sets `is_active = false` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use depot_core::{
  entity::{Entity, NewRecord, RecordChanges},
  page::{DEFAULT_LIMIT, DEFAULT_SKIP, ListQuery, Page},
  record::Record,
  store::ResourceStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Records to skip before the page starts. Default 0.
  pub skip:      Option<i64>,
  /// Maximum records returned. Default 100.
  pub limit:     Option<i64>,
  /// Restrict to active (`true`) or inactive (`false`) records.
  pub is_active: Option<bool>,
}

impl ListParams {
  fn into_query<T: Entity>(self) -> Result<ListQuery, ApiError> {
    let page = Page::new(
      self.skip.unwrap_or(DEFAULT_SKIP),
      self.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .map_err(ApiError::from_store::<T>)?;
    Ok(ListQuery { page, is_active: self.is_active })
  }
}

/// `GET /{path}[?skip=<n>][&limit=<n>][&is_active=<bool>]`
pub async fn list<T, S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Record<T>>>, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let query = params.into_query::<T>()?;
  let records = store.list(query).await.map_err(ApiError::from_store::<T>)?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /{path}`
pub async fn create<T, S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewRecord<T>>,
) -> Result<impl IntoResponse, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let record = store.create(body).await.map_err(ApiError::from_store::<T>)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{path}/{id}`
pub async fn get_one<T, S>(
  State(store): State<Arc<S>>,
  Path(id): Path<u64>,
) -> Result<Json<Record<T>>, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let record = store.get(id).await.map_err(ApiError::from_store::<T>)?;
  Ok(Json(record))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /{path}/{id}` and `PATCH /{path}/{id}`
pub async fn update<T, S>(
  State(store): State<Arc<S>>,
  Path(id): Path<u64>,
  Json(body): Json<RecordChanges<T::Changes>>,
) -> Result<Json<Record<T>>, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let record = store.update(id, body).await.map_err(ApiError::from_store::<T>)?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{path}/{id}`
pub async fn delete<T, S>(
  State(store): State<Arc<S>>,
  Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  store.delete(id).await.map_err(ApiError::from_store::<T>)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Activation ───────────────────────────────────────────────────────────────

/// `POST /{path}/{id}/activate`
pub async fn activate<T, S>(
  State(store): State<Arc<S>>,
  Path(id): Path<u64>,
) -> Result<Json<Record<T>>, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let record = store.activate(id).await.map_err(ApiError::from_store::<T>)?;
  Ok(Json(record))
}

/// `POST /{path}/{id}/deactivate`
pub async fn deactivate<T, S>(
  State(store): State<Arc<S>>,
  Path(id): Path<u64>,
) -> Result<Json<Record<T>>, ApiError>
where
  T: Entity,
  S: ResourceStore<T>,
{
  let record = store.deactivate(id).await.map_err(ApiError::from_store::<T>)?;
  Ok(Json(record))
}
