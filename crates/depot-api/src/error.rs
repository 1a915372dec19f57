//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use depot_core::entity::Entity;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{message}")]
  Duplicate {
    message: String,
    field:   &'static str,
    value:   String,
  },

  #[error("unprocessable: {message}")]
  Unprocessable { message: String, field: &'static str },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Translate a store failure on a `T` collection into its HTTP form.
  pub fn from_store<T: Entity>(err: impl Into<depot_core::Error>) -> Self {
    match err.into() {
      depot_core::Error::NotFound { entity, .. } => {
        ApiError::NotFound(format!("{entity} not found"))
      }
      depot_core::Error::DuplicateKey { field, value } => ApiError::Duplicate {
        message: duplicate_message(T::LABEL, field),
        field,
        value,
      },
      depot_core::Error::InvalidArgument { field, reason } => ApiError::Unprocessable {
        message: format!("invalid {field}: {reason}"),
        field,
      },
      depot_core::Error::Backend(e) => ApiError::Store(e),
    }
  }
}

/// `"email"` → "Email already registered", `"name"` on stations →
/// "Station name already exists", `"license_plate"` → "License plate already
/// exists".
fn duplicate_message(label: &str, field: &str) -> String {
  match field {
    "email" => "Email already registered".to_owned(),
    "name" => format!("{label} name already exists"),
    other => {
      let words = other.replace('_', " ");
      let mut chars = words.chars();
      match chars.next() {
        Some(first) => format!("{}{} already exists", first.to_uppercase(), chars.as_str()),
        None => "Value already exists".to_owned(),
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(message) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
      }
      ApiError::Duplicate { message, field, value } => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message, "field": field, "value": value })),
      )
        .into_response(),
      ApiError::Unprocessable { message, field } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message, "field": field })),
      )
        .into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" })))
          .into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use depot_core::entities::{Sender, Station, Vehicle};

  use super::*;

  fn duplicate<T: Entity>() -> String {
    let err = depot_core::Error::DuplicateKey {
      field: T::UNIQUE_FIELD,
      value: "x".into(),
    };
    ApiError::from_store::<T>(err).to_string()
  }

  #[test]
  fn duplicate_messages_name_the_key() {
    assert_eq!(duplicate::<Sender>(), "Email already registered");
    assert_eq!(duplicate::<Station>(), "Station name already exists");
    assert_eq!(duplicate::<Vehicle>(), "License plate already exists");
  }

  #[tokio::test]
  async fn backend_failure_hides_its_message() {
    let source: Box<dyn std::error::Error + Send + Sync> = "disk I/O error at /var/db".into();
    let resp = ApiError::from_store::<Station>(depot_core::Error::Backend(source)).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "internal error" }));
  }

  #[test]
  fn not_found_uses_entity_label() {
    let err = depot_core::Error::NotFound { entity: Sender::LABEL, id: 3 };
    assert!(matches!(
      ApiError::from_store::<Sender>(err),
      ApiError::NotFound(m) if m == "Sender not found"
    ));
  }
}
