//! Handlers for `/api/announcements`. Posting is staff-only; the listing
//! is public so the marketing pages can surface notices too.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use enroll_core::{
  announcement::{Announcement, NewAnnouncement},
  identity::IdentityProvider,
  mailer::Mailer,
  store::AdmissionStore,
};

use crate::{AppState, auth::StaffSession, error::Error};

/// `POST /api/announcements`
pub async fn post_one<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Json(announcement): Json<NewAnnouncement>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  announcement.validate()?;
  let record = state
    .store
    .post_announcement(announcement)
    .await
    .map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/announcements` — newest first.
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<Announcement>>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let records = state
    .store
    .list_announcements()
    .await
    .map_err(Error::store)?;
  Ok(Json(records))
}
