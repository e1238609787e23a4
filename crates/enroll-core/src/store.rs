//! The `AdmissionStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `enroll-store-sqlite`). Higher layers (`enroll-portal`, the lifecycle
//! engine) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  announcement::{Announcement, NewAnnouncement},
  applicant::{AdmissionStatus, ApplicantRecord, Application},
  feedback::{Feedback, NewFeedback},
  staff::{StaffProfile, StaffRecord},
  support::{NewTicket, SupportTicket},
};

// ─── Partition counts ────────────────────────────────────────────────────────

/// Sizes of all three workflow partitions, tracked together so review
/// clients can render live badge counts regardless of which tab is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCounts {
  pub pending:  u64,
  pub approved: u64,
  pub rejected: u64,
}

// ─── Decision outcome ────────────────────────────────────────────────────────

/// Result of a conditional approve/reject update.
///
/// The move is a single `status = 'pending'`-guarded update; losing a race
/// with a concurrent operator is a typed outcome, never a silent duplicate.
#[derive(Debug, Clone)]
pub enum DecisionOutcome {
  /// The record transitioned; here is its post-decision state.
  Moved(ApplicantRecord),
  NotFound,
  /// Another operator decided first; the record's current terminal status.
  AlreadyDecided(AdmissionStatus),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the admission store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AdmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Applicants ────────────────────────────────────────────────────────

  /// Persist a validated application as a new `Pending` record with a
  /// store-assigned id and creation timestamp. Duplicate emails are
  /// deliberately allowed at this stage.
  fn submit_application(
    &self,
    application: Application,
  ) -> impl Future<Output = Result<ApplicantRecord, Self::Error>> + Send + '_;

  fn get_applicant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ApplicantRecord>, Self::Error>> + Send + '_;

  /// All records currently in `status`, newest first.
  fn list_applicants(
    &self,
    status: AdmissionStatus,
  ) -> impl Future<Output = Result<Vec<ApplicantRecord>, Self::Error>> + Send + '_;

  fn partition_counts(
    &self,
  ) -> impl Future<Output = Result<PartitionCounts, Self::Error>> + Send + '_;

  /// Atomically move a pending record to `approved`, stamping the
  /// provisioned account id, the generated credential snapshot and the
  /// action date.
  fn approve_applicant<'a>(
    &'a self,
    id:                 Uuid,
    account_id:         Uuid,
    generated_password: &'a str,
    action_date:        DateTime<Utc>,
  ) -> impl Future<Output = Result<DecisionOutcome, Self::Error>> + Send + 'a;

  /// Atomically move a pending record to `rejected`, stamping the action
  /// date. All intake fields are carried verbatim.
  fn reject_applicant(
    &self,
    id:          Uuid,
    action_date: DateTime<Utc>,
  ) -> impl Future<Output = Result<DecisionOutcome, Self::Error>> + Send + '_;

  /// Roster lookup for student login and profile display. Exact match on
  /// the lowercase-trimmed email, approved partition only.
  fn find_approved_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<ApplicantRecord>, Self::Error>> + Send + 'a;

  // ── Staff ─────────────────────────────────────────────────────────────

  fn add_staff(
    &self,
    profile:    StaffProfile,
    account_id: Uuid,
  ) -> impl Future<Output = Result<StaffRecord, Self::Error>> + Send + '_;

  /// Roster lookup for admin login.
  fn find_staff_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StaffRecord>, Self::Error>> + Send + 'a;

  fn list_staff(
    &self,
  ) -> impl Future<Output = Result<Vec<StaffRecord>, Self::Error>> + Send + '_;

  // ── Feedback — append-only ────────────────────────────────────────────

  fn add_feedback(
    &self,
    feedback: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_feedback(
    &self,
  ) -> impl Future<Output = Result<Vec<Feedback>, Self::Error>> + Send + '_;

  // ── Support tickets ───────────────────────────────────────────────────

  fn open_ticket(
    &self,
    ticket: NewTicket,
  ) -> impl Future<Output = Result<SupportTicket, Self::Error>> + Send + '_;

  /// Newest first, all statuses; the help-centre review view.
  fn list_tickets(
    &self,
  ) -> impl Future<Output = Result<Vec<SupportTicket>, Self::Error>> + Send + '_;

  // ── Announcements ─────────────────────────────────────────────────────

  fn post_announcement(
    &self,
    announcement: NewAnnouncement,
  ) -> impl Future<Output = Result<Announcement, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_announcements(
    &self,
  ) -> impl Future<Output = Result<Vec<Announcement>, Self::Error>> + Send + '_;
}
