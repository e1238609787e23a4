//! Handlers for `/api/feedback`. Submissions need a session; the listing
//! is public — it feeds the landing-page testimonial wall.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use enroll_core::{
  feedback::{Feedback, NewFeedback},
  identity::IdentityProvider,
  mailer::Mailer,
  store::AdmissionStore,
};

use crate::{AppState, auth::SessionAuth, error::Error};

/// `POST /api/feedback`
pub async fn submit<S, M>(
  _session: SessionAuth,
  State(state): State<AppState<S, M>>,
  Json(feedback): Json<NewFeedback>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  feedback.validate()?;
  let entry = state
    .store
    .add_feedback(feedback)
    .await
    .map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /api/feedback` — newest first.
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<Feedback>>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let entries = state.store.list_feedback().await.map_err(Error::store)?;
  Ok(Json(entries))
}
