//! Portal error type and [`axum::response::IntoResponse`] implementation.
//!
//! Core errors keep their operator-facing `Display` wording; this module
//! only decides the HTTP status they ride on.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] enroll_core::Error),

  #[error("unauthorized")]
  Unauthorized,

  /// Authenticated, but not on the staff roster.
  #[error("forbidden")]
  Forbidden,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    use enroll_core::Error as Core;
    match self {
      Error::Core(e) => match e {
        Core::MissingField(_)
        | Core::MissingPhoto
        | Core::NoSubjects
        | Core::PhotoTooLarge { .. }
        | Core::UnknownClassLevel(_)
        | Core::UnknownSubject(_)
        | Core::UnknownStatus(_) => StatusCode::BAD_REQUEST,
        Core::ApplicantNotFound(_) => StatusCode::NOT_FOUND,
        Core::AlreadyDecided { .. } | Core::EmailTaken(_) => StatusCode::CONFLICT,
        Core::InvalidCredential => StatusCode::UNAUTHORIZED,
        Core::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        Core::NotOnRoster(_) => StatusCode::FORBIDDEN,
        Core::Serialization(_) | Core::Store(_) | Core::Identity(_) | Core::Mail(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
