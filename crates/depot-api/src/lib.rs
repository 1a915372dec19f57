//! JSON REST API for Depot.
//!
//! Exposes an axum [`Router`] with one set of CRUD routes per collection,
//! each backed by its own [`ResourceStore`]. Transport and middleware are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let api = ApiBuilder::new()
//!   .collection::<Station, _>(stations)
//!   .collection::<Vehicle, _>(vehicles)
//!   .build();
//! let app = Router::new().nest("/api/v1", api);
//! ```

pub mod error;
pub mod resources;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use depot_core::{entity::Entity, store::ResourceStore};

pub use error::ApiError;

/// Assembles the routes of several collections into one router.
#[derive(Default)]
pub struct ApiBuilder {
  router: Router,
  paths:  Vec<&'static str>,
}

impl ApiBuilder {
  pub fn new() -> Self { Self::default() }

  /// Mount the routes for `T` under `/{T::PATH}`, backed by `store`.
  pub fn collection<T, S>(mut self, store: Arc<S>) -> Self
  where
    T: Entity,
    S: ResourceStore<T> + 'static,
  {
    let collection = format!("/{}", T::PATH);
    let item = format!("/{}/{{id}}", T::PATH);

    let routes = Router::new()
      .route(
        &collection,
        get(resources::list::<T, S>).post(resources::create::<T, S>),
      )
      .route(
        &item,
        get(resources::get_one::<T, S>)
          .put(resources::update::<T, S>)
          .patch(resources::update::<T, S>)
          .delete(resources::delete::<T, S>),
      )
      .route(&format!("{item}/activate"), post(resources::activate::<T, S>))
      .route(&format!("{item}/deactivate"), post(resources::deactivate::<T, S>))
      .with_state(store);

    self.router = self.router.merge(routes);
    self.paths.push(T::PATH);
    self
  }

  /// Path segments of the mounted collections, in mount order.
  pub fn paths(&self) -> &[&'static str] { &self.paths }

  /// The finished router. It carries no state of its own, so it can be
  /// nested into any parent router.
  pub fn build(self) -> Router { self.router }
}
