//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use enroll_core::{
  announcement::NewAnnouncement,
  applicant::{AdmissionStatus, ApplicationForm, Application, ClassLevel, SubjectChoice},
  feedback::NewFeedback,
  identity::{AuthOutcome, IdentityProvider, ProvisionOutcome},
  lifecycle,
  staff::StaffForm,
  store::{AdmissionStore, DecisionOutcome},
  support::NewTicket,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn application(email: &str) -> Application {
  ApplicationForm {
    first_name: "Ashish".into(),
    last_name: "Kumar".into(),
    blood_group: "A+".into(),
    dob: "2004-05-12".into(),
    email: email.into(),
    phone: "9800000000".into(),
    father_name: "Raj Kumar".into(),
    father_phone: "9800000001".into(),
    mother_name: "Sita Kumar".into(),
    mother_phone: "9800000002".into(),
    temp_address: "12 Lake Road".into(),
    class_level: Some(ClassLevel::Class12),
    subjects: vec![SubjectChoice::Physics, SubjectChoice::Maths],
    gender: "Male".into(),
    heard_from: "Google Search".into(),
    photo_url: Some("http://localhost/photos/Ashish_2004.jpg".into()),
    ..ApplicationForm::default()
  }
  .validate()
  .expect("valid form")
}

fn staff_profile(email: &str) -> enroll_core::staff::StaffProfile {
  StaffForm {
    first_name: "Rakesh".into(),
    last_name: "Sharma".into(),
    email: email.into(),
    phone: "9800000010".into(),
    dob: "1988-03-02".into(),
    gender: "Male".into(),
    blood_group: "B+".into(),
    teaching_class: "Class 12".into(),
    teaching_subject: "Physics".into(),
    designation: "Senior Faculty".into(),
    temp_address: "4 Hill Street".into(),
    ..StaffForm::default()
  }
  .validate()
  .expect("valid staff form")
}

// ─── Applicants ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_and_get_applicant() {
  let s = store().await;

  let record = s.submit_application(application("a@example.com")).await.unwrap();
  assert_eq!(record.status, AdmissionStatus::Pending);
  assert!(record.account_id.is_none());

  let fetched = s.get_applicant(record.applicant_id).await.unwrap().unwrap();
  assert_eq!(fetched.applicant_id, record.applicant_id);
  assert_eq!(fetched.application.email, "a@example.com");
  assert_eq!(fetched.application.class_level, ClassLevel::Class12);
  assert_eq!(
    fetched.application.subjects,
    vec![SubjectChoice::Physics, SubjectChoice::Maths]
  );
}

#[tokio::test]
async fn get_applicant_missing_returns_none() {
  let s = store().await;
  assert!(s.get_applicant(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_pending_emails_are_allowed() {
  let s = store().await;
  s.submit_application(application("dup@example.com")).await.unwrap();
  s.submit_application(application("dup@example.com")).await.unwrap();

  let pending = s.list_applicants(AdmissionStatus::Pending).await.unwrap();
  assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn list_is_partitioned_by_status() {
  let s = store().await;
  let a = s.submit_application(application("a@example.com")).await.unwrap();
  s.submit_application(application("b@example.com")).await.unwrap();

  s.reject_applicant(a.applicant_id, Utc::now()).await.unwrap();

  let pending = s.list_applicants(AdmissionStatus::Pending).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].application.email, "b@example.com");

  let rejected = s.list_applicants(AdmissionStatus::Rejected).await.unwrap();
  assert_eq!(rejected.len(), 1);
  assert_eq!(rejected[0].application.email, "a@example.com");
}

// ─── Decisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_stamps_decision_fields() {
  let s = store().await;
  let record = s.submit_application(application("a@example.com")).await.unwrap();

  let account_id = Uuid::new_v4();
  let outcome = s
    .approve_applicant(record.applicant_id, account_id, "ASH2004", Utc::now())
    .await
    .unwrap();

  let DecisionOutcome::Moved(moved) = outcome else {
    panic!("expected Moved");
  };
  assert_eq!(moved.status, AdmissionStatus::Approved);
  assert_eq!(moved.account_id, Some(account_id));
  assert_eq!(moved.generated_password.as_deref(), Some("ASH2004"));
  assert!(moved.action_date.is_some());
  // Intake fields carried verbatim.
  assert_eq!(moved.application.father_name, "Raj Kumar");
}

#[tokio::test]
async fn decision_races_produce_one_winner() {
  let s = store().await;
  let record = s.submit_application(application("a@example.com")).await.unwrap();

  let first = s
    .approve_applicant(record.applicant_id, Uuid::new_v4(), "ASH2004", Utc::now())
    .await
    .unwrap();
  assert!(matches!(first, DecisionOutcome::Moved(_)));

  // The losing decision sees the terminal status, not a second move.
  let second = s
    .reject_applicant(record.applicant_id, Utc::now())
    .await
    .unwrap();
  assert!(matches!(
    second,
    DecisionOutcome::AlreadyDecided(AdmissionStatus::Approved)
  ));
}

#[tokio::test]
async fn decide_unknown_applicant_is_not_found() {
  let s = store().await;
  let outcome = s.reject_applicant(Uuid::new_v4(), Utc::now()).await.unwrap();
  assert!(matches!(outcome, DecisionOutcome::NotFound));
}

#[tokio::test]
async fn counts_track_every_partition() {
  let s = store().await;
  let mut rx = s.watch_counts();
  assert_eq!(rx.borrow_and_update().pending, 0);

  let a = s.submit_application(application("a@example.com")).await.unwrap();
  let b = s.submit_application(application("b@example.com")).await.unwrap();
  s.submit_application(application("c@example.com")).await.unwrap();

  s.approve_applicant(a.applicant_id, Uuid::new_v4(), "ASH2004", Utc::now())
    .await
    .unwrap();
  s.reject_applicant(b.applicant_id, Utc::now()).await.unwrap();

  let counts = s.partition_counts().await.unwrap();
  assert_eq!(counts.pending, 1);
  assert_eq!(counts.approved, 1);
  assert_eq!(counts.rejected, 1);

  // The watch channel converged on the same numbers.
  assert_eq!(*rx.borrow_and_update(), counts);
}

#[tokio::test]
async fn approved_roster_lookup_ignores_pending() {
  let s = store().await;
  let record = s.submit_application(application("a@example.com")).await.unwrap();

  assert!(s.find_approved_by_email("a@example.com").await.unwrap().is_none());

  s.approve_applicant(record.applicant_id, Uuid::new_v4(), "ASH2004", Utc::now())
    .await
    .unwrap();

  let found = s.find_approved_by_email("a@example.com").await.unwrap().unwrap();
  assert_eq!(found.applicant_id, record.applicant_id);
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_account_rejects_duplicate_email() {
  let s = store().await;

  let first = s.create_account("a@example.com", "ASH2004").await.unwrap();
  assert!(matches!(first, ProvisionOutcome::Created(_)));

  let second = s.create_account("a@example.com", "other").await.unwrap();
  assert!(matches!(second, ProvisionOutcome::EmailTaken));
}

#[tokio::test]
async fn authenticate_round_trip() {
  let s = store().await;
  s.create_account("a@example.com", "ASH2004").await.unwrap();

  let outcome = s.authenticate("a@example.com", "ASH2004").await.unwrap();
  let AuthOutcome::Granted(session) = outcome else {
    panic!("expected Granted");
  };
  assert_eq!(session.email, "a@example.com");

  let live = s.session(session.token).await.unwrap().unwrap();
  assert_eq!(live.account_id, session.account_id);

  s.sign_out(session.token).await.unwrap();
  assert!(s.session(session.token).await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_password_is_invalid_credential() {
  let s = store().await;
  s.create_account("a@example.com", "ASH2004").await.unwrap();

  let outcome = s.authenticate("a@example.com", "nope").await.unwrap();
  assert!(matches!(outcome, AuthOutcome::InvalidCredential));

  // The failure never opens a session.
  let outcome = s.authenticate("unknown@example.com", "nope").await.unwrap();
  assert!(matches!(outcome, AuthOutcome::InvalidCredential));
}

#[tokio::test]
async fn five_failures_trip_the_throttle() {
  let s = store().await;
  s.create_account("a@example.com", "ASH2004").await.unwrap();

  for _ in 0..5 {
    let outcome = s.authenticate("a@example.com", "nope").await.unwrap();
    assert!(matches!(outcome, AuthOutcome::InvalidCredential));
  }

  // Even the correct credential is refused once throttled.
  let outcome = s.authenticate("a@example.com", "ASH2004").await.unwrap();
  assert!(matches!(outcome, AuthOutcome::TooManyAttempts));
}

// ─── Lifecycle engine over the real backend ──────────────────────────────────

#[tokio::test]
async fn full_admission_lifecycle() {
  let s = store().await;
  let record = s.submit_application(application("ashish@example.com")).await.unwrap();

  let outcome = lifecycle::approve(&s, &s, record.applicant_id).await.unwrap();
  assert_eq!(outcome.generated_password, "ASH2004");

  // The freshly provisioned credential signs in.
  let auth = s
    .authenticate("ashish@example.com", &outcome.generated_password)
    .await
    .unwrap();
  assert!(matches!(auth, AuthOutcome::Granted(_)));

  // And a second decision is refused.
  let err = lifecycle::reject(&s, record.applicant_id).await.unwrap_err();
  assert!(matches!(err, enroll_core::Error::AlreadyDecided { .. }));
}

// ─── Staff ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_staff() {
  let s = store().await;
  let account_id = Uuid::new_v4();

  let record = s.add_staff(staff_profile("rakesh@example.com"), account_id).await.unwrap();
  assert_eq!(record.account_id, account_id);
  assert_eq!(record.profile.name, "Rakesh Sharma");

  let found = s.find_staff_by_email("rakesh@example.com").await.unwrap().unwrap();
  assert_eq!(found.staff_id, record.staff_id);

  assert!(s.find_staff_by_email("other@example.com").await.unwrap().is_none());
  assert_eq!(s.list_staff().await.unwrap().len(), 1);
}

// ─── Feedback, tickets, announcements ────────────────────────────────────────

#[tokio::test]
async fn feedback_defaults_and_lists() {
  let s = store().await;

  s.add_feedback(NewFeedback {
    name: "Jane Doe".into(),
    email: "jane@example.com".into(),
    photo_url: None,
    message: "Great teachers.".into(),
    rating: None,
  })
  .await
  .unwrap();

  let listed = s.list_feedback().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].rating, 5);
}

#[tokio::test]
async fn open_ticket_assigns_reference() {
  let s = store().await;

  let ticket = s
    .open_ticket(NewTicket {
      email: "jane@example.com".into(),
      subject: "Login issue".into(),
      message: "Cannot sign in.".into(),
    })
    .await
    .unwrap();

  assert!(ticket.ticket_ref.starts_with("ENR-"));
  assert_eq!(ticket.status, "open");

  let listed = s.list_tickets().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].ticket_ref, ticket.ticket_ref);
  assert_eq!(listed[0].subject, "Login issue");
}

#[tokio::test]
async fn post_and_list_announcements() {
  let s = store().await;

  s.post_announcement(NewAnnouncement {
    title: "Holiday".into(),
    body: "Closed on Friday.".into(),
  })
  .await
  .unwrap();

  let listed = s.list_announcements().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].title, "Holiday");
}
