//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Subject lists are stored
//! as compact JSON arrays. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use enroll_core::{
  announcement::Announcement,
  applicant::{AdmissionStatus, ApplicantRecord, Application, ClassLevel, SubjectChoice},
  feedback::Feedback,
  identity::Session,
  staff::{StaffProfile, StaffRecord},
  support::SupportTicket,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AdmissionStatus ─────────────────────────────────────────────────────────

pub fn encode_status(s: AdmissionStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<AdmissionStatus> {
  match s {
    "Pending" => Ok(AdmissionStatus::Pending),
    "approved" => Ok(AdmissionStatus::Approved),
    "rejected" => Ok(AdmissionStatus::Rejected),
    other => Err(Error::Core(enroll_core::Error::UnknownStatus(other.to_owned()))),
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub fn encode_subjects(subjects: &[SubjectChoice]) -> Result<String> {
  Ok(serde_json::to_string(subjects)?)
}

pub fn decode_subjects(s: &str) -> Result<Vec<SubjectChoice>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `applicants` row.
pub struct RawApplicant {
  pub applicant_id:       String,
  pub first_name:         String,
  pub last_name:          String,
  pub blood_group:        String,
  pub dob:                String,
  pub email:              String,
  pub phone:              String,
  pub alt_contact:        Option<String>,
  pub father_name:        String,
  pub father_phone:       String,
  pub mother_name:        String,
  pub mother_phone:       String,
  pub temp_address:       String,
  pub perm_address:       Option<String>,
  pub class_level:        String,
  pub subjects:           String,
  pub gender:             String,
  pub heard_from:         String,
  pub additional_notes:   Option<String>,
  pub photo_url:          String,
  pub status:             String,
  pub created_at:         String,
  pub action_date:        Option<String>,
  pub account_id:         Option<String>,
  pub generated_password: Option<String>,
}

impl RawApplicant {
  pub fn into_record(self) -> Result<ApplicantRecord> {
    let application = Application {
      first_name:       self.first_name,
      last_name:        self.last_name,
      blood_group:      self.blood_group,
      dob:              self.dob,
      email:            self.email,
      phone:            self.phone,
      alt_contact:      self.alt_contact,
      father_name:      self.father_name,
      father_phone:     self.father_phone,
      mother_name:      self.mother_name,
      mother_phone:     self.mother_phone,
      temp_address:     self.temp_address,
      perm_address:     self.perm_address,
      class_level:      ClassLevel::parse(&self.class_level).map_err(Error::Core)?,
      subjects:         decode_subjects(&self.subjects)?,
      gender:           self.gender,
      heard_from:       self.heard_from,
      additional_notes: self.additional_notes,
      photo_url:        self.photo_url,
    };

    Ok(ApplicantRecord {
      applicant_id: decode_uuid(&self.applicant_id)?,
      application,
      status: decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      action_date: self.action_date.as_deref().map(decode_dt).transpose()?,
      account_id: self.account_id.as_deref().map(decode_uuid).transpose()?,
      generated_password: self.generated_password,
    })
  }
}

/// Raw strings read directly from a `staff` row.
pub struct RawStaff {
  pub staff_id:         String,
  pub account_id:       String,
  pub first_name:       String,
  pub last_name:        String,
  pub name:             String,
  pub email:            String,
  pub phone:            String,
  pub alt_phone:        Option<String>,
  pub dob:              String,
  pub gender:           String,
  pub blood_group:      String,
  pub teaching_class:   String,
  pub teaching_subject: String,
  pub designation:      String,
  pub temp_address:     String,
  pub perm_address:     Option<String>,
  pub created_at:       String,
}

impl RawStaff {
  pub fn into_record(self) -> Result<StaffRecord> {
    Ok(StaffRecord {
      staff_id:   decode_uuid(&self.staff_id)?,
      account_id: decode_uuid(&self.account_id)?,
      profile:    StaffProfile {
        first_name:       self.first_name,
        last_name:        self.last_name,
        name:             self.name,
        email:            self.email,
        phone:            self.phone,
        alt_phone:        self.alt_phone,
        dob:              self.dob,
        gender:           self.gender,
        blood_group:      self.blood_group,
        teaching_class:   self.teaching_class,
        teaching_subject: self.teaching_subject,
        designation:      self.designation,
        temp_address:     self.temp_address,
        perm_address:     self.perm_address,
      },
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `feedback` row.
pub struct RawFeedback {
  pub feedback_id: String,
  pub name:        String,
  pub email:       String,
  pub photo_url:   Option<String>,
  pub message:     String,
  pub rating:      i64,
  pub posted_at:   String,
}

impl RawFeedback {
  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      feedback_id: decode_uuid(&self.feedback_id)?,
      name:        self.name,
      email:       self.email,
      photo_url:   self.photo_url,
      message:     self.message,
      rating:      self.rating.clamp(1, 5) as u8,
      posted_at:   decode_dt(&self.posted_at)?,
    })
  }
}

/// Raw strings read directly from a `support_tickets` row.
pub struct RawTicket {
  pub ticket_ref: String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub status:     String,
  pub created_at: String,
}

impl RawTicket {
  pub fn into_ticket(self) -> Result<SupportTicket> {
    Ok(SupportTicket {
      ticket_ref: self.ticket_ref,
      email:      self.email,
      subject:    self.subject,
      message:    self.message,
      status:     self.status,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `announcements` row.
pub struct RawAnnouncement {
  pub announcement_id: String,
  pub title:           String,
  pub body:            String,
  pub posted_at:       String,
}

impl RawAnnouncement {
  pub fn into_announcement(self) -> Result<Announcement> {
    Ok(Announcement {
      announcement_id: decode_uuid(&self.announcement_id)?,
      title:           self.title,
      body:            self.body,
      posted_at:       decode_dt(&self.posted_at)?,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub token:      String,
  pub account_id: String,
  pub email:      String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      token:      decode_uuid(&self.token)?,
      account_id: decode_uuid(&self.account_id)?,
      email:      self.email,
    })
  }
}
