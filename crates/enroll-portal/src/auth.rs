//! Bearer-token extractors.
//!
//! [`SessionAuth`] resolves the token to a live session; [`StaffSession`]
//! additionally requires the session's email to be on the staff roster.
//! Roster membership is re-checked on every request, so removing a staff
//! row locks the account out immediately.

use axum::{extract::FromRequestParts, http::request::Parts};
use enroll_core::{
  identity::{IdentityProvider, Session},
  staff::StaffRecord,
  store::AdmissionStore,
};

use crate::{AppState, error::Error};

/// A request carrying any valid session.
pub struct SessionAuth(pub Session);

/// A request from a logged-in staff member.
pub struct StaffSession {
  pub session: Session,
  pub staff:   StaffRecord,
}

fn bearer_token(parts: &Parts) -> Result<uuid::Uuid, Error> {
  let header = parts
    .headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let token = header.strip_prefix("Bearer ").ok_or(Error::Unauthorized)?;
  uuid::Uuid::parse_str(token.trim()).map_err(|_| Error::Unauthorized)
}

impl<S, M> FromRequestParts<AppState<S, M>> for SessionAuth
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts)?;
    let session = IdentityProvider::session(&*state.store, token)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;
    Ok(SessionAuth(session))
  }
}

impl<S, M> FromRequestParts<AppState<S, M>> for StaffSession
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    let SessionAuth(session) =
      SessionAuth::from_request_parts(parts, state).await?;

    let staff = state
      .store
      .find_staff_by_email(&session.email)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Forbidden)?;

    Ok(StaffSession { session, staff })
  }
}
