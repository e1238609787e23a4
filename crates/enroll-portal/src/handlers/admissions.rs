//! Handlers for `/api/admissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/admissions` | Public intake; body is the raw form |
//! | `GET`  | `/api/admissions` | Staff; `?status=Pending\|approved\|rejected` |
//! | `GET`  | `/api/admissions/counts` | Staff; `?wait=true` long-polls |
//! | `GET`  | `/api/admissions/{id}` | Staff |
//! | `POST` | `/api/admissions/{id}/approve` | Staff; returns the credential |
//! | `POST` | `/api/admissions/{id}/reject` | Staff |

use std::time::Duration;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use enroll_core::{
  applicant::{AdmissionStatus, ApplicantRecord, ApplicationForm},
  identity::IdentityProvider,
  lifecycle,
  mailer::{Mailer, OutboundMail},
  store::{AdmissionStore, PartitionCounts},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::StaffSession, error::Error, mail::send_best_effort};

/// How long a `?wait=true` counts request is parked before returning the
/// unchanged snapshot anyway.
const COUNTS_WAIT: Duration = Duration::from_secs(25);

// ─── Intake ──────────────────────────────────────────────────────────────────

/// `POST /api/admissions` — public admission intake.
///
/// Validation failures name the first offending field. The confirmation
/// mail is best-effort: the pending record survives delivery trouble.
pub async fn submit<S, M>(
  State(state): State<AppState<S, M>>,
  Json(form): Json<ApplicationForm>,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let application = form.validate()?;
  let record = state
    .store
    .submit_application(application)
    .await
    .map_err(Error::store)?;

  send_best_effort(
    &*state.mailer,
    OutboundMail::admission_received(
      record.display_name(),
      record.application.email.clone(),
    ),
  )
  .await;

  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Review reads ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<AdmissionStatus>,
}

/// `GET /api/admissions[?status=<status>]` — defaults to the pending queue.
pub async fn list<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ApplicantRecord>>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let status = params.status.unwrap_or(AdmissionStatus::Pending);
  let records = state
    .store
    .list_applicants(status)
    .await
    .map_err(Error::store)?;
  Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct CountsParams {
  /// When true, hold the request until the counts change (or the wait
  /// window lapses) instead of answering immediately.
  #[serde(default)]
  pub wait: bool,
}

/// `GET /api/admissions/counts[?wait=true]`
pub async fn counts<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Query(params): Query<CountsParams>,
) -> Result<Json<PartitionCounts>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let mut rx = state.counts.clone();
  // Mark the current value seen so `changed()` waits for the next move.
  let current = *rx.borrow_and_update();

  if params.wait {
    match tokio::time::timeout(COUNTS_WAIT, rx.changed()).await {
      Ok(Ok(())) => return Ok(Json(*rx.borrow())),
      // Sender dropped or window lapsed: fall through to the snapshot.
      Ok(Err(_)) | Err(_) => {}
    }
  }

  Ok(Json(current))
}

/// `GET /api/admissions/{id}`
pub async fn get_one<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApplicantRecord>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let record = state
    .store
    .get_applicant(id)
    .await
    .map_err(Error::store)?
    .ok_or(enroll_core::Error::ApplicantNotFound(id))?;
  Ok(Json(record))
}

// ─── Decisions ───────────────────────────────────────────────────────────────

/// `POST /api/admissions/{id}/approve`
///
/// Provisions the student account and returns the generated credential so
/// the operator can hand it over. A lost race or duplicate email comes
/// back as 409.
pub async fn approve<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<lifecycle::ApprovalOutcome>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let outcome = lifecycle::approve(&*state.store, &*state.store, id).await?;
  Ok(Json(outcome))
}

/// `POST /api/admissions/{id}/reject`
pub async fn reject<S, M>(
  _staff: StaffSession,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApplicantRecord>, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  let record = lifecycle::reject(&*state.store, id).await?;
  Ok(Json(record))
}
