//! The admission lifecycle engine.
//!
//! `Pending → Approved` provisions an identity account and stamps the
//! generated credential; `Pending → Rejected` stamps the action date.
//! Both terminal states are final. The move itself is the store's single
//! conditional update, so two operators racing on one record produce one
//! winner and one typed [`Error::AlreadyDecided`] — never a duplicate.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  applicant::ApplicantRecord,
  identity::{IdentityProvider, ProvisionOutcome},
  password::generate_password,
  staff::{StaffProfile, StaffRecord},
  store::{AdmissionStore, DecisionOutcome},
};

/// What the operator gets back from a completed approval, reported
/// synchronously: the credential pair to hand to the student.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
  pub record:             ApplicantRecord,
  pub email:              String,
  pub account_id:         Uuid,
  pub generated_password: String,
}

/// A completed staff registration.
#[derive(Debug, Clone, Serialize)]
pub struct StaffRegistration {
  pub record:             StaffRecord,
  pub generated_password: String,
}

/// Approve a pending applicant.
///
/// Ordering is load-bearing: the identity account is provisioned *before*
/// the record moves, so a duplicate email aborts with the pending record
/// untouched. If the conditional move then loses a race, the provisioned
/// account survives as residue — surfaced via [`Error::AlreadyDecided`]
/// and reconciled manually.
pub async fn approve<S, I>(
  store:        &S,
  identity:     &I,
  applicant_id: Uuid,
) -> Result<ApprovalOutcome>
where
  S: AdmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: IdentityProvider,
  I::Error: std::error::Error + Send + Sync + 'static,
{
  let record = store
    .get_applicant(applicant_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ApplicantNotFound(applicant_id))?;

  if !record.status.is_pending() {
    return Err(Error::AlreadyDecided { id: applicant_id, status: record.status });
  }

  let password = generate_password(
    Some(&record.application.first_name),
    Some(&record.application.dob),
  );

  let account_id = match identity
    .create_account(&record.application.email, &password)
    .await
    .map_err(Error::identity)?
  {
    ProvisionOutcome::Created(account_id) => account_id,
    ProvisionOutcome::EmailTaken => {
      return Err(Error::EmailTaken(record.application.email.clone()));
    }
  };

  match store
    .approve_applicant(applicant_id, account_id, &password, Utc::now())
    .await
    .map_err(Error::store)?
  {
    DecisionOutcome::Moved(record) => Ok(ApprovalOutcome {
      email: record.application.email.clone(),
      account_id,
      generated_password: password,
      record,
    }),
    DecisionOutcome::NotFound => Err(Error::ApplicantNotFound(applicant_id)),
    DecisionOutcome::AlreadyDecided(status) => {
      Err(Error::AlreadyDecided { id: applicant_id, status })
    }
  }
}

/// Reject a pending applicant. No identity-provider interaction.
pub async fn reject<S>(store: &S, applicant_id: Uuid) -> Result<ApplicantRecord>
where
  S: AdmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match store
    .reject_applicant(applicant_id, Utc::now())
    .await
    .map_err(Error::store)?
  {
    DecisionOutcome::Moved(record) => Ok(record),
    DecisionOutcome::NotFound => Err(Error::ApplicantNotFound(applicant_id)),
    DecisionOutcome::AlreadyDecided(status) => {
      Err(Error::AlreadyDecided { id: applicant_id, status })
    }
  }
}

/// Register a staff member: roster duplicate check, deterministic
/// credential, identity provisioning, record write — in that order, so a
/// duplicate aborts before anything is created.
pub async fn register_staff<S, I>(
  store:    &S,
  identity: &I,
  profile:  StaffProfile,
) -> Result<StaffRegistration>
where
  S: AdmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: IdentityProvider,
  I::Error: std::error::Error + Send + Sync + 'static,
{
  if store
    .find_staff_by_email(&profile.email)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::EmailTaken(profile.email));
  }

  let password = generate_password(Some(&profile.first_name), Some(&profile.dob));

  let account_id = match identity
    .create_account(&profile.email, &password)
    .await
    .map_err(Error::identity)?
  {
    ProvisionOutcome::Created(account_id) => account_id,
    ProvisionOutcome::EmailTaken => return Err(Error::EmailTaken(profile.email)),
  };

  let record = store
    .add_staff(profile, account_id)
    .await
    .map_err(Error::store)?;

  Ok(StaffRegistration { record, generated_password: password })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use chrono::{DateTime, Utc};

  use super::*;
  use crate::{
    announcement::{Announcement, NewAnnouncement},
    applicant::{
      AdmissionStatus, ApplicationForm, ClassLevel, SubjectChoice,
    },
    feedback::{Feedback, NewFeedback},
    gate::{Role, login},
    identity::{AuthOutcome, Session},
    store::PartitionCounts,
    support::{NewTicket, SupportTicket},
  };

  // In-memory doubles, enough to drive the engine and the gate.

  #[derive(Default)]
  struct MemStore {
    applicants: Mutex<HashMap<Uuid, ApplicantRecord>>,
    staff:      Mutex<Vec<StaffRecord>>,
  }

  impl MemStore {
    fn insert_pending(&self, record: ApplicantRecord) -> Uuid {
      let id = record.applicant_id;
      self.applicants.lock().unwrap().insert(id, record);
      id
    }
  }

  impl AdmissionStore for MemStore {
    type Error = std::convert::Infallible;

    async fn submit_application(
      &self,
      application: crate::applicant::Application,
    ) -> Result<ApplicantRecord, Self::Error> {
      let record = ApplicantRecord {
        applicant_id: Uuid::new_v4(),
        application,
        status: AdmissionStatus::Pending,
        created_at: Utc::now(),
        action_date: None,
        account_id: None,
        generated_password: None,
      };
      self.insert_pending(record.clone());
      Ok(record)
    }

    async fn get_applicant(&self, id: Uuid) -> Result<Option<ApplicantRecord>, Self::Error> {
      Ok(self.applicants.lock().unwrap().get(&id).cloned())
    }

    async fn list_applicants(
      &self,
      status: AdmissionStatus,
    ) -> Result<Vec<ApplicantRecord>, Self::Error> {
      Ok(
        self
          .applicants
          .lock()
          .unwrap()
          .values()
          .filter(|r| r.status == status)
          .cloned()
          .collect(),
      )
    }

    async fn partition_counts(&self) -> Result<PartitionCounts, Self::Error> {
      let mut counts = PartitionCounts::default();
      for r in self.applicants.lock().unwrap().values() {
        match r.status {
          AdmissionStatus::Pending => counts.pending += 1,
          AdmissionStatus::Approved => counts.approved += 1,
          AdmissionStatus::Rejected => counts.rejected += 1,
        }
      }
      Ok(counts)
    }

    async fn approve_applicant(
      &self,
      id:                 Uuid,
      account_id:         Uuid,
      generated_password: &str,
      action_date:        DateTime<Utc>,
    ) -> Result<DecisionOutcome, Self::Error> {
      let mut map = self.applicants.lock().unwrap();
      let Some(record) = map.get_mut(&id) else {
        return Ok(DecisionOutcome::NotFound);
      };
      if record.status != AdmissionStatus::Pending {
        return Ok(DecisionOutcome::AlreadyDecided(record.status));
      }
      record.status = AdmissionStatus::Approved;
      record.account_id = Some(account_id);
      record.generated_password = Some(generated_password.to_owned());
      record.action_date = Some(action_date);
      Ok(DecisionOutcome::Moved(record.clone()))
    }

    async fn reject_applicant(
      &self,
      id:          Uuid,
      action_date: DateTime<Utc>,
    ) -> Result<DecisionOutcome, Self::Error> {
      let mut map = self.applicants.lock().unwrap();
      let Some(record) = map.get_mut(&id) else {
        return Ok(DecisionOutcome::NotFound);
      };
      if record.status != AdmissionStatus::Pending {
        return Ok(DecisionOutcome::AlreadyDecided(record.status));
      }
      record.status = AdmissionStatus::Rejected;
      record.action_date = Some(action_date);
      Ok(DecisionOutcome::Moved(record.clone()))
    }

    async fn find_approved_by_email(
      &self,
      email: &str,
    ) -> Result<Option<ApplicantRecord>, Self::Error> {
      Ok(
        self
          .applicants
          .lock()
          .unwrap()
          .values()
          .find(|r| r.status == AdmissionStatus::Approved && r.application.email == email)
          .cloned(),
      )
    }

    async fn add_staff(
      &self,
      profile:    StaffProfile,
      account_id: Uuid,
    ) -> Result<StaffRecord, Self::Error> {
      let record = StaffRecord {
        staff_id: Uuid::new_v4(),
        account_id,
        profile,
        created_at: Utc::now(),
      };
      self.staff.lock().unwrap().push(record.clone());
      Ok(record)
    }

    async fn find_staff_by_email(
      &self,
      email: &str,
    ) -> Result<Option<StaffRecord>, Self::Error> {
      Ok(
        self
          .staff
          .lock()
          .unwrap()
          .iter()
          .find(|s| s.profile.email == email)
          .cloned(),
      )
    }

    async fn list_staff(&self) -> Result<Vec<StaffRecord>, Self::Error> {
      Ok(self.staff.lock().unwrap().clone())
    }

    async fn add_feedback(&self, _: NewFeedback) -> Result<Feedback, Self::Error> {
      unimplemented!()
    }
    async fn list_feedback(&self) -> Result<Vec<Feedback>, Self::Error> {
      unimplemented!()
    }
    async fn open_ticket(&self, _: NewTicket) -> Result<SupportTicket, Self::Error> {
      unimplemented!()
    }
    async fn list_tickets(&self) -> Result<Vec<SupportTicket>, Self::Error> {
      unimplemented!()
    }
    async fn post_announcement(
      &self,
      _: NewAnnouncement,
    ) -> Result<Announcement, Self::Error> {
      unimplemented!()
    }
    async fn list_announcements(&self) -> Result<Vec<Announcement>, Self::Error> {
      unimplemented!()
    }
  }

  /// Identity double: accounts keyed by email, sessions by token, and a
  /// sign-out counter so tests can assert the gate's clean-up behaviour.
  #[derive(Default)]
  struct MemIdentity {
    accounts:  Mutex<HashMap<String, (Uuid, String)>>,
    sessions:  Mutex<HashMap<Uuid, Session>>,
    sign_outs: AtomicUsize,
  }

  impl IdentityProvider for MemIdentity {
    type Error = std::convert::Infallible;

    async fn create_account(
      &self,
      email:    &str,
      password: &str,
    ) -> Result<ProvisionOutcome, Self::Error> {
      let mut accounts = self.accounts.lock().unwrap();
      if accounts.contains_key(email) {
        return Ok(ProvisionOutcome::EmailTaken);
      }
      let account_id = Uuid::new_v4();
      accounts.insert(email.to_owned(), (account_id, password.to_owned()));
      Ok(ProvisionOutcome::Created(account_id))
    }

    async fn authenticate(
      &self,
      email:    &str,
      password: &str,
    ) -> Result<AuthOutcome, Self::Error> {
      let accounts = self.accounts.lock().unwrap();
      match accounts.get(email) {
        Some((account_id, stored)) if stored == password => {
          let session = Session {
            token: Uuid::new_v4(),
            account_id: *account_id,
            email: email.to_owned(),
          };
          self
            .sessions
            .lock()
            .unwrap()
            .insert(session.token, session.clone());
          Ok(AuthOutcome::Granted(session))
        }
        _ => Ok(AuthOutcome::InvalidCredential),
      }
    }

    async fn sign_out(&self, token: Uuid) -> Result<(), Self::Error> {
      self.sessions.lock().unwrap().remove(&token);
      self.sign_outs.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    async fn session(&self, token: Uuid) -> Result<Option<Session>, Self::Error> {
      Ok(self.sessions.lock().unwrap().get(&token).cloned())
    }
  }

  fn sample_form(email: &str) -> ApplicationForm {
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
      subjects: vec![SubjectChoice::Physics, SubjectChoice::Chemistry],
      gender: "Male".into(),
      heard_from: "Google Search".into(),
      photo_url: Some("http://localhost/photos/Ashish_2004.jpg".into()),
      ..ApplicationForm::default()
    }
  }

  async fn pending_applicant(store: &MemStore, email: &str) -> Uuid {
    let application = sample_form(email).validate().unwrap();
    store
      .submit_application(application)
      .await
      .unwrap()
      .applicant_id
  }

  #[tokio::test]
  async fn approve_moves_record_and_provisions_account() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let id = pending_applicant(&store, "jane@example.com").await;

    let outcome = approve(&store, &identity, id).await.unwrap();
    assert_eq!(outcome.generated_password, "ASH2004");
    assert_eq!(outcome.email, "jane@example.com");

    let record = store.get_applicant(id).await.unwrap().unwrap();
    assert_eq!(record.status, AdmissionStatus::Approved);
    assert_eq!(record.account_id, Some(outcome.account_id));
    assert_eq!(record.generated_password.as_deref(), Some("ASH2004"));
    assert!(record.action_date.is_some());

    let counts = store.partition_counts().await.unwrap();
    assert_eq!(counts, PartitionCounts { pending: 0, approved: 1, rejected: 0 });
  }

  #[tokio::test]
  async fn duplicate_email_leaves_pending_record_untouched() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    // Pre-register the email as an existing identity.
    identity
      .create_account("jane@example.com", "whatever")
      .await
      .unwrap();

    let id = pending_applicant(&store, "jane@example.com").await;
    let err = approve(&store, &identity, id).await.unwrap_err();
    assert!(matches!(err, Error::EmailTaken(_)));

    let record = store.get_applicant(id).await.unwrap().unwrap();
    assert_eq!(record.status, AdmissionStatus::Pending);
    assert!(record.account_id.is_none());
  }

  #[tokio::test]
  async fn second_approve_is_already_decided() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let id = pending_applicant(&store, "jane@example.com").await;

    approve(&store, &identity, id).await.unwrap();
    let err = approve(&store, &identity, id).await.unwrap_err();
    assert!(matches!(
      err,
      Error::AlreadyDecided { status: AdmissionStatus::Approved, .. }
    ));
  }

  #[tokio::test]
  async fn approve_unknown_id_is_not_found() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let err = approve(&store, &identity, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::ApplicantNotFound(_)));
  }

  #[tokio::test]
  async fn reject_stamps_action_date_and_keeps_fields() {
    let store = MemStore::default();
    let id = pending_applicant(&store, "jane@example.com").await;
    let before = store.get_applicant(id).await.unwrap().unwrap();

    let record = reject(&store, id).await.unwrap();
    assert_eq!(record.status, AdmissionStatus::Rejected);
    assert!(record.action_date.is_some());
    assert!(record.account_id.is_none());
    assert_eq!(record.application.email, before.application.email);
    assert_eq!(record.application.photo_url, before.application.photo_url);
  }

  #[tokio::test]
  async fn student_login_requires_approved_roster() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let id = pending_applicant(&store, "jane@example.com").await;
    let outcome = approve(&store, &identity, id).await.unwrap();

    let grant = login(
      &store,
      &identity,
      "jane@example.com",
      &outcome.generated_password,
      Role::Student,
    )
    .await
    .unwrap();
    assert_eq!(grant.landing, "/student");
    assert_eq!(grant.display_name, "Ashish Kumar");
  }

  #[tokio::test]
  async fn valid_credential_wrong_role_is_denied_and_signed_out() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let id = pending_applicant(&store, "jane@example.com").await;
    let outcome = approve(&store, &identity, id).await.unwrap();

    // The student's credential is valid, but the email is not on the
    // admin roster.
    let err = login(
      &store,
      &identity,
      "jane@example.com",
      &outcome.generated_password,
      Role::Admin,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotOnRoster(Role::Admin)));
    assert_eq!(identity.sign_outs.load(Ordering::SeqCst), 1);
    assert!(identity.sessions.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn wrong_password_is_invalid_credential() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let id = pending_applicant(&store, "jane@example.com").await;
    approve(&store, &identity, id).await.unwrap();

    let err = login(&store, &identity, "jane@example.com", "nope", Role::Student)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidCredential));
  }

  #[tokio::test]
  async fn staff_registration_provisions_and_records() {
    let store = MemStore::default();
    let identity = MemIdentity::default();
    let profile = crate::staff::StaffForm {
      first_name: "Rakesh".into(),
      last_name: "Sharma".into(),
      email: "rakesh@example.com".into(),
      phone: "9800000010".into(),
      dob: "1988-03-02".into(),
      gender: "Male".into(),
      blood_group: "B+".into(),
      teaching_class: "Class 12".into(),
      teaching_subject: "Physics".into(),
      designation: "Senior Faculty".into(),
      temp_address: "4 Hill Street".into(),
      ..Default::default()
    }
    .validate()
    .unwrap();

    let registration = register_staff(&store, &identity, profile).await.unwrap();
    assert_eq!(registration.generated_password, "RAK1988");

    // Duplicate roster email aborts before provisioning another account.
    let again = crate::staff::StaffForm {
      first_name: "Rakesh".into(),
      last_name: "Sharma".into(),
      email: "rakesh@example.com".into(),
      phone: "9800000010".into(),
      dob: "1988-03-02".into(),
      gender: "Male".into(),
      blood_group: "B+".into(),
      teaching_class: "Class 12".into(),
      teaching_subject: "Physics".into(),
      designation: "Senior Faculty".into(),
      temp_address: "4 Hill Street".into(),
      ..Default::default()
    }
    .validate()
    .unwrap();
    let err = register_staff(&store, &identity, again).await.unwrap_err();
    assert!(matches!(err, Error::EmailTaken(_)));
    assert_eq!(identity.accounts.lock().unwrap().len(), 1);
  }
}
