//! HTTP server assembly for Depot.
//!
//! Builds the five collection stores on the configured backend, mounts them
//! under `/api/v1`, and adds the service banner, health check, and request
//! tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use depot_api::ApiBuilder;
use depot_core::entities::{DeliveryStaff, Receiver, Sender, Station, Vehicle};
use depot_store_memory::MemoryStore;
use depot_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Mount point of the collection routes.
pub const API_PREFIX: &str = "/api/v1";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`ResourceStore`](depot_core::store::ResourceStore) implementation
/// backs the collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Records live in process memory and vanish on restart.
  #[default]
  Memory,
  /// Records persist in one SQLite file, one table per collection.
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEPOT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub backend:    Backend,
  /// Database file for the `sqlite` backend; ignored otherwise.
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8000,
      backend:    Backend::Memory,
      store_path: PathBuf::from("depot.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Collections ──────────────────────────────────────────────────────────────

/// All five collections over in-memory stores.
pub fn memory_collections() -> ApiBuilder {
  ApiBuilder::new()
    .collection::<Sender, _>(Arc::new(MemoryStore::<Sender>::new()))
    .collection::<Receiver, _>(Arc::new(MemoryStore::<Receiver>::new()))
    .collection::<DeliveryStaff, _>(Arc::new(MemoryStore::<DeliveryStaff>::new()))
    .collection::<Station, _>(Arc::new(MemoryStore::<Station>::new()))
    .collection::<Vehicle, _>(Arc::new(MemoryStore::<Vehicle>::new()))
}

/// All five collections as tables of one SQLite database.
pub async fn sqlite_collections(path: &Path) -> depot_store_sqlite::Result<ApiBuilder> {
  let conn = depot_store_sqlite::connect(path).await?;

  let senders = SqliteStore::<Sender>::attach(conn.clone()).await?;
  let receivers = SqliteStore::<Receiver>::attach(conn.clone()).await?;
  let staff = SqliteStore::<DeliveryStaff>::attach(conn.clone()).await?;
  let stations = SqliteStore::<Station>::attach(conn.clone()).await?;
  let vehicles = SqliteStore::<Vehicle>::attach(conn).await?;

  Ok(
    ApiBuilder::new()
      .collection::<Sender, _>(Arc::new(senders))
      .collection::<Receiver, _>(Arc::new(receivers))
      .collection::<DeliveryStaff, _>(Arc::new(staff))
      .collection::<Station, _>(Arc::new(stations))
      .collection::<Vehicle, _>(Arc::new(vehicles)),
  )
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Wrap the collection routes with the service-level endpoints.
pub fn app(collections: ApiBuilder) -> Router {
  let banner = json!({
    "service":     "depot",
    "version":     env!("CARGO_PKG_VERSION"),
    "api":         API_PREFIX,
    "collections": collections.paths(),
  });

  Router::new()
    .route("/", get(move || async move { Json(banner) }))
    .route("/health", get(health))
    .nest(API_PREFIX, collections.build())
    .layer(TraceLayer::new_for_http())
}

/// Build the full application for `config`, opening the backend it names.
pub async fn router(config: &ServerConfig) -> depot_store_sqlite::Result<Router> {
  let collections = match config.backend {
    Backend::Memory => memory_collections(),
    Backend::Sqlite => {
      let path = expand_tilde(&config.store_path);
      tracing::info!(path = %path.display(), "opening sqlite store");
      sqlite_collections(&path).await?
    }
  };
  Ok(app(collections))
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "healthy" })) }
