//! [`SqliteStore`] — the SQLite implementation of [`AdmissionStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;
use uuid::Uuid;

use enroll_core::{
  announcement::{Announcement, NewAnnouncement},
  applicant::{AdmissionStatus, ApplicantRecord, Application},
  feedback::{Feedback, NewFeedback},
  staff::{StaffProfile, StaffRecord},
  store::{AdmissionStore, DecisionOutcome, PartitionCounts},
  support::{NewTicket, SupportTicket, ticket_ref},
};

use crate::{
  Error, Result,
  encode::{
    RawAnnouncement, RawApplicant, RawFeedback, RawStaff, RawTicket,
    decode_status, encode_dt, encode_status, encode_subjects, encode_uuid,
  },
  schema::SCHEMA,
};

/// Column list for every `applicants` SELECT, in [`applicant_from_row`] order.
const APPLICANT_COLS: &str = "applicant_id, first_name, last_name, blood_group, \
   dob, email, phone, alt_contact, father_name, father_phone, mother_name, \
   mother_phone, temp_address, perm_address, class_level, subjects, gender, \
   heard_from, additional_notes, photo_url, status, created_at, action_date, \
   account_id, generated_password";

fn applicant_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawApplicant> {
  Ok(RawApplicant {
    applicant_id:       row.get(0)?,
    first_name:         row.get(1)?,
    last_name:          row.get(2)?,
    blood_group:        row.get(3)?,
    dob:                row.get(4)?,
    email:              row.get(5)?,
    phone:              row.get(6)?,
    alt_contact:        row.get(7)?,
    father_name:        row.get(8)?,
    father_phone:       row.get(9)?,
    mother_name:        row.get(10)?,
    mother_phone:       row.get(11)?,
    temp_address:       row.get(12)?,
    perm_address:       row.get(13)?,
    class_level:        row.get(14)?,
    subjects:           row.get(15)?,
    gender:             row.get(16)?,
    heard_from:         row.get(17)?,
    additional_notes:   row.get(18)?,
    photo_url:          row.get(19)?,
    status:             row.get(20)?,
    created_at:         row.get(21)?,
    action_date:        row.get(22)?,
    account_id:         row.get(23)?,
    generated_password: row.get(24)?,
  })
}

const STAFF_COLS: &str = "staff_id, account_id, first_name, last_name, name, \
   email, phone, alt_phone, dob, gender, blood_group, teaching_class, \
   teaching_subject, designation, temp_address, perm_address, created_at";

fn staff_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStaff> {
  Ok(RawStaff {
    staff_id:         row.get(0)?,
    account_id:       row.get(1)?,
    first_name:       row.get(2)?,
    last_name:        row.get(3)?,
    name:             row.get(4)?,
    email:            row.get(5)?,
    phone:            row.get(6)?,
    alt_phone:        row.get(7)?,
    dob:              row.get(8)?,
    gender:           row.get(9)?,
    blood_group:      row.get(10)?,
    teaching_class:   row.get(11)?,
    teaching_subject: row.get(12)?,
    designation:      row.get(13)?,
    temp_address:     row.get(14)?,
    perm_address:     row.get(15)?,
    created_at:       row.get(16)?,
  })
}

/// What the guarded decision UPDATE found, before domain decoding.
enum RawDecision {
  Moved(RawApplicant),
  NotFound,
  /// Row exists but already left the pending partition; its current status.
  Already(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The admission store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted and the
/// counts channel is shared. Every applicant mutation republishes
/// [`PartitionCounts`] on the watch channel, so review clients can hold a
/// receiver instead of polling.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  counts_tx:       watch::Sender<PartitionCounts>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (counts_tx, _) = watch::channel(PartitionCounts::default());
    let store = Self { conn, counts_tx };
    store
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    store.refresh_counts().await?;
    Ok(store)
  }

  /// A receiver that yields the current partition sizes and every
  /// subsequent change.
  pub fn watch_counts(&self) -> watch::Receiver<PartitionCounts> {
    self.counts_tx.subscribe()
  }

  async fn query_counts(&self) -> Result<PartitionCounts> {
    let rows: Vec<(String, u64)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT status, COUNT(*) FROM applicants GROUP BY status")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut counts = PartitionCounts::default();
    for (status, n) in rows {
      match decode_status(&status)? {
        AdmissionStatus::Pending => counts.pending = n,
        AdmissionStatus::Approved => counts.approved = n,
        AdmissionStatus::Rejected => counts.rejected = n,
      }
    }
    Ok(counts)
  }

  /// Re-publish partition sizes after an applicant mutation.
  async fn refresh_counts(&self) -> Result<()> {
    let counts = self.query_counts().await?;
    self.counts_tx.send_replace(counts);
    Ok(())
  }

  async fn fetch_applicant(&self, id_str: String) -> Result<Option<RawApplicant>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {APPLICANT_COLS} FROM applicants WHERE applicant_id = ?1"),
              rusqlite::params![id_str],
              applicant_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── AdmissionStore impl ─────────────────────────────────────────────────────

impl AdmissionStore for SqliteStore {
  type Error = Error;

  // ── Applicants ────────────────────────────────────────────────────────────

  async fn submit_application(&self, application: Application) -> Result<ApplicantRecord> {
    let record = ApplicantRecord {
      applicant_id: Uuid::new_v4(),
      application,
      status: AdmissionStatus::Pending,
      created_at: Utc::now(),
      action_date: None,
      account_id: None,
      generated_password: None,
    };

    let id_str       = encode_uuid(record.applicant_id);
    let subjects_str = encode_subjects(&record.application.subjects)?;
    let status_str   = encode_status(record.status).to_owned();
    let at_str       = encode_dt(record.created_at);
    let a            = record.application.clone();
    let class_str    = a.class_level.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO applicants (
             applicant_id, first_name, last_name, blood_group, dob, email,
             phone, alt_contact, father_name, father_phone, mother_name,
             mother_phone, temp_address, perm_address, class_level, subjects,
             gender, heard_from, additional_notes, photo_url, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
          rusqlite::params![
            id_str,
            a.first_name,
            a.last_name,
            a.blood_group,
            a.dob,
            a.email,
            a.phone,
            a.alt_contact,
            a.father_name,
            a.father_phone,
            a.mother_name,
            a.mother_phone,
            a.temp_address,
            a.perm_address,
            class_str,
            subjects_str,
            a.gender,
            a.heard_from,
            a.additional_notes,
            a.photo_url,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.refresh_counts().await?;
    Ok(record)
  }

  async fn get_applicant(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
    let raw = self.fetch_applicant(encode_uuid(id)).await?;
    raw.map(RawApplicant::into_record).transpose()
  }

  async fn list_applicants(&self, status: AdmissionStatus) -> Result<Vec<ApplicantRecord>> {
    let status_str = encode_status(status).to_owned();

    let raws: Vec<RawApplicant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {APPLICANT_COLS} FROM applicants
           WHERE status = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], applicant_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApplicant::into_record).collect()
  }

  async fn partition_counts(&self) -> Result<PartitionCounts> {
    self.query_counts().await
  }

  async fn approve_applicant(
    &self,
    id:                 Uuid,
    account_id:         Uuid,
    generated_password: &str,
    action_date:        DateTime<Utc>,
  ) -> Result<DecisionOutcome> {
    let id_str       = encode_uuid(id);
    let account_str  = encode_uuid(account_id);
    let password     = generated_password.to_owned();
    let date_str     = encode_dt(action_date);
    let approved_str = encode_status(AdmissionStatus::Approved).to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        // The status guard makes the move atomic: of two racing decisions
        // exactly one sees an affected row.
        let changed = conn.execute(
          "UPDATE applicants
           SET status = ?2, account_id = ?3, generated_password = ?4,
               action_date = ?5
           WHERE applicant_id = ?1 AND status = 'Pending'",
          rusqlite::params![id_str, approved_str, account_str, password, date_str],
        )?;

        if changed == 0 {
          let status: Option<String> = conn
            .query_row(
              "SELECT status FROM applicants WHERE applicant_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?;
          return Ok(match status {
            Some(status) => RawDecision::Already(status),
            None => RawDecision::NotFound,
          });
        }

        let raw = conn.query_row(
          &format!("SELECT {APPLICANT_COLS} FROM applicants WHERE applicant_id = ?1"),
          rusqlite::params![id_str],
          applicant_from_row,
        )?;
        Ok(RawDecision::Moved(raw))
      })
      .await?;

    let outcome = match raw {
      RawDecision::Moved(raw) => {
        self.refresh_counts().await?;
        DecisionOutcome::Moved(raw.into_record()?)
      }
      RawDecision::NotFound => DecisionOutcome::NotFound,
      RawDecision::Already(status) => {
        DecisionOutcome::AlreadyDecided(decode_status(&status)?)
      }
    };
    Ok(outcome)
  }

  async fn reject_applicant(
    &self,
    id:          Uuid,
    action_date: DateTime<Utc>,
  ) -> Result<DecisionOutcome> {
    let id_str       = encode_uuid(id);
    let date_str     = encode_dt(action_date);
    let rejected_str = encode_status(AdmissionStatus::Rejected).to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE applicants
           SET status = ?2, action_date = ?3
           WHERE applicant_id = ?1 AND status = 'Pending'",
          rusqlite::params![id_str, rejected_str, date_str],
        )?;

        if changed == 0 {
          let status: Option<String> = conn
            .query_row(
              "SELECT status FROM applicants WHERE applicant_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?;
          return Ok(match status {
            Some(status) => RawDecision::Already(status),
            None => RawDecision::NotFound,
          });
        }

        let raw = conn.query_row(
          &format!("SELECT {APPLICANT_COLS} FROM applicants WHERE applicant_id = ?1"),
          rusqlite::params![id_str],
          applicant_from_row,
        )?;
        Ok(RawDecision::Moved(raw))
      })
      .await?;

    let outcome = match raw {
      RawDecision::Moved(raw) => {
        self.refresh_counts().await?;
        DecisionOutcome::Moved(raw.into_record()?)
      }
      RawDecision::NotFound => DecisionOutcome::NotFound,
      RawDecision::Already(status) => {
        DecisionOutcome::AlreadyDecided(decode_status(&status)?)
      }
    };
    Ok(outcome)
  }

  async fn find_approved_by_email(&self, email: &str) -> Result<Option<ApplicantRecord>> {
    let email = email.to_owned();

    let raw: Option<RawApplicant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {APPLICANT_COLS} FROM applicants
                 WHERE email = ?1 AND status = 'approved'"
              ),
              rusqlite::params![email],
              applicant_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplicant::into_record).transpose()
  }

  // ── Staff ─────────────────────────────────────────────────────────────────

  async fn add_staff(&self, profile: StaffProfile, account_id: Uuid) -> Result<StaffRecord> {
    let record = StaffRecord {
      staff_id: Uuid::new_v4(),
      account_id,
      profile,
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(record.staff_id);
    let account_str = encode_uuid(record.account_id);
    let at_str      = encode_dt(record.created_at);
    let p           = record.profile.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO staff (
             staff_id, account_id, first_name, last_name, name, email, phone,
             alt_phone, dob, gender, blood_group, teaching_class,
             teaching_subject, designation, temp_address, perm_address,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17)",
          rusqlite::params![
            id_str,
            account_str,
            p.first_name,
            p.last_name,
            p.name,
            p.email,
            p.phone,
            p.alt_phone,
            p.dob,
            p.gender,
            p.blood_group,
            p.teaching_class,
            p.teaching_subject,
            p.designation,
            p.temp_address,
            p.perm_address,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn find_staff_by_email(&self, email: &str) -> Result<Option<StaffRecord>> {
    let email = email.to_owned();

    let raw: Option<RawStaff> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STAFF_COLS} FROM staff WHERE email = ?1"),
              rusqlite::params![email],
              staff_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStaff::into_record).transpose()
  }

  async fn list_staff(&self) -> Result<Vec<StaffRecord>> {
    let raws: Vec<RawStaff> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STAFF_COLS} FROM staff ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], staff_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStaff::into_record).collect()
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn add_feedback(&self, feedback: NewFeedback) -> Result<Feedback> {
    feedback.validate().map_err(Error::Core)?;

    let entry = Feedback {
      feedback_id: Uuid::new_v4(),
      rating:      feedback.normalized_rating(),
      name:        feedback.name,
      email:       feedback.email,
      photo_url:   feedback.photo_url,
      message:     feedback.message,
      posted_at:   Utc::now(),
    };

    let id_str    = encode_uuid(entry.feedback_id);
    let at_str    = encode_dt(entry.posted_at);
    let name      = entry.name.clone();
    let email     = entry.email.clone();
    let photo_url = entry.photo_url.clone();
    let message   = entry.message.clone();
    let rating    = entry.rating as i64;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback (
             feedback_id, name, email, photo_url, message, rating, posted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, email, photo_url, message, rating, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn list_feedback(&self) -> Result<Vec<Feedback>> {
    let raws: Vec<RawFeedback> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT feedback_id, name, email, photo_url, message, rating, posted_at
           FROM feedback ORDER BY posted_at DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFeedback {
              feedback_id: row.get(0)?,
              name:        row.get(1)?,
              email:       row.get(2)?,
              photo_url:   row.get(3)?,
              message:     row.get(4)?,
              rating:      row.get(5)?,
              posted_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedback::into_feedback).collect()
  }

  // ── Support tickets ───────────────────────────────────────────────────────

  async fn open_ticket(&self, ticket: NewTicket) -> Result<SupportTicket> {
    ticket.validate().map_err(Error::Core)?;

    let record = SupportTicket {
      ticket_ref: ticket_ref(),
      email:      ticket.email,
      subject:    ticket.subject,
      message:    ticket.message,
      status:     "open".to_owned(),
      created_at: Utc::now(),
    };

    let r      = record.clone();
    let at_str = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO support_tickets (
             ticket_ref, email, subject, message, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![r.ticket_ref, r.email, r.subject, r.message, r.status, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
    let raws: Vec<RawTicket> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT ticket_ref, email, subject, message, status, created_at
           FROM support_tickets ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTicket {
              ticket_ref: row.get(0)?,
              email:      row.get(1)?,
              subject:    row.get(2)?,
              message:    row.get(3)?,
              status:     row.get(4)?,
              created_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTicket::into_ticket).collect()
  }

  // ── Announcements ─────────────────────────────────────────────────────────

  async fn post_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement> {
    announcement.validate().map_err(Error::Core)?;

    let record = Announcement {
      announcement_id: Uuid::new_v4(),
      title:           announcement.title,
      body:            announcement.body,
      posted_at:       Utc::now(),
    };

    let id_str = encode_uuid(record.announcement_id);
    let at_str = encode_dt(record.posted_at);
    let title  = record.title.clone();
    let body   = record.body.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO announcements (announcement_id, title, body, posted_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, title, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_announcements(&self) -> Result<Vec<Announcement>> {
    let raws: Vec<RawAnnouncement> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT announcement_id, title, body, posted_at
           FROM announcements ORDER BY posted_at DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAnnouncement {
              announcement_id: row.get(0)?,
              title:           row.get(1)?,
              body:            row.get(2)?,
              posted_at:       row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawAnnouncement::into_announcement)
      .collect()
  }
}
