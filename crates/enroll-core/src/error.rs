//! Error types for `enroll-core`.
//!
//! Validation and gate variants carry the exact operator-facing wording; the
//! portal surfaces their `Display` output unchanged.

use thiserror::Error;
use uuid::Uuid;

use crate::{applicant::AdmissionStatus, gate::Role};

#[derive(Debug, Error)]
pub enum Error {
  // ── Intake validation ─────────────────────────────────────────────────

  #[error("Please fill the {0} field.")]
  MissingField(&'static str),

  #[error("Please upload a profile photo.")]
  MissingPhoto,

  #[error("Please select at least one subject.")]
  NoSubjects,

  /// The photo byte ceiling is enforced before any upload happens.
  #[error("Photo size must be less than 200KB.")]
  PhotoTooLarge { size: usize },

  // ── Lifecycle ─────────────────────────────────────────────────────────

  #[error("applicant not found: {0}")]
  ApplicantNotFound(Uuid),

  /// Approve/reject hit a record that already left the pending partition.
  #[error("applicant {id} was already decided ({status})")]
  AlreadyDecided { id: Uuid, status: AdmissionStatus },

  #[error("Email already exists: {0}")]
  EmailTaken(String),

  // ── Session gate ──────────────────────────────────────────────────────

  #[error("Invalid email or password. Please check your credentials.")]
  InvalidCredential,

  #[error("Too many failed attempts. Try again later.")]
  TooManyAttempts,

  /// Valid credential, but the email is absent from the role's roster.
  #[error("Access Denied: This email is not registered as {}.", .0.roster_label())]
  NotOnRoster(Role),

  // ── Decoding ──────────────────────────────────────────────────────────

  #[error("unknown class level: {0:?}")]
  UnknownClassLevel(String),

  #[error("unknown subject: {0:?}")]
  UnknownSubject(String),

  #[error("unknown admission status: {0:?}")]
  UnknownStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  // ── Collaborator failures ─────────────────────────────────────────────

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("identity provider error: {0}")]
  Identity(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("mail error: {0}")]
  Mail(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn identity<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Identity(Box::new(e))
  }

  pub fn mail<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Mail(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
