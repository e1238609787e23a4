//! Handlers for `/api/session` and `/api/profile`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use enroll_core::{
  applicant::ApplicantRecord,
  gate::{self, LoginGrant, Role},
  identity::IdentityProvider,
  mailer::Mailer,
  staff::StaffRecord,
  store::AdmissionStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::SessionAuth, error::Error};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

/// `POST /api/session` — dual-pass login.
///
/// Credential check first, then the roster for the claimed role. A valid
/// credential under the wrong role is 403, with no surviving session.
pub async fn login<S, M>(
  State(state): State<AppState<S, M>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginGrant>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let grant = gate::login(
    &*state.store,
    &*state.store,
    &body.email,
    &body.password,
    body.role,
  )
  .await?;
  Ok(Json(grant))
}

/// `DELETE /api/session`
pub async fn logout<S, M>(
  SessionAuth(session): SessionAuth,
  State(state): State<AppState<S, M>>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  IdentityProvider::sign_out(&*state.store, session.token)
    .await
    .map_err(Error::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// What `/api/profile` returns, depending on which roster the session's
/// email is found on. Staff wins when an email is somehow on both.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
  Admin { staff: StaffRecord },
  Student { applicant: ApplicantRecord },
}

/// `GET /api/profile`
pub async fn profile<S, M>(
  SessionAuth(session): SessionAuth,
  State(state): State<AppState<S, M>>,
) -> Result<Json<Profile>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  if let Some(staff) = state
    .store
    .find_staff_by_email(&session.email)
    .await
    .map_err(Error::store)?
  {
    return Ok(Json(Profile::Admin { staff }));
  }

  if let Some(applicant) = state
    .store
    .find_approved_by_email(&session.email)
    .await
    .map_err(Error::store)?
  {
    return Ok(Json(Profile::Student { applicant }));
  }

  // Session exists but the email left both rosters.
  Err(Error::Core(enroll_core::Error::NotOnRoster(Role::Student)))
}
