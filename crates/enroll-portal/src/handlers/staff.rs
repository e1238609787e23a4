//! Handlers for `/api/staff` endpoints. Staff-roster access only.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use enroll_core::{
  identity::IdentityProvider,
  lifecycle,
  mailer::{Mailer, OutboundMail},
  staff::{StaffForm, StaffRecord},
  store::AdmissionStore,
};

use crate::{AppState, auth::StaffSession, error::Error, mail::send_best_effort};

/// `POST /api/staff` — register a staff member and provision their account.
///
/// The response carries the generated credential; it is also mailed to the
/// new staff member, best-effort.
pub async fn register<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Json(form): Json<StaffForm>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let profile = form.validate()?;
  let registration =
    lifecycle::register_staff(&*state.store, &*state.store, profile).await?;

  send_best_effort(
    &*state.mailer,
    OutboundMail::staff_credentials(
      registration.record.profile.name.clone(),
      registration.record.profile.email.clone(),
      registration.generated_password.clone(),
      registration.record.profile.designation.clone(),
    ),
  )
  .await;

  Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /api/staff`
pub async fn list<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<StaffRecord>>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let staff = state.store.list_staff().await.map_err(Error::store)?;
  Ok(Json(staff))
}
