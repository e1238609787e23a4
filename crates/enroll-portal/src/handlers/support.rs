//! Handlers for `/api/tickets` — the student help centre.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use enroll_core::{
  identity::IdentityProvider,
  mailer::Mailer,
  store::AdmissionStore,
  support::{NewTicket, SupportTicket},
};

use crate::{
  AppState,
  auth::{SessionAuth, StaffSession},
  error::Error,
};

/// `POST /api/tickets` — opens a ticket and returns its `ENR-` reference.
pub async fn open<S, M>(
  _session: SessionAuth,
  State(state): State<AppState<S, M>>,
  Json(ticket): Json<NewTicket>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  ticket.validate()?;
  let record = state.store.open_ticket(ticket).await.map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/tickets` — newest first, staff only.
pub async fn list<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<SupportTicket>>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let tickets = state.store.list_tickets().await.map_err(Error::store)?;
  Ok(Json(tickets))
}
