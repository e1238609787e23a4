//! Applicant records and the admission application form.
//!
//! An applicant lives in a single table for its whole life; the pending /
//! approved / rejected partitions of the workflow are values of
//! [`AdmissionStatus`], so a decision is one atomic status update rather
//! than a cross-collection copy-then-delete.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, gate::normalize_email};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where an applicant currently sits in the admission workflow.
///
/// `Approved` and `Rejected` are terminal: the only transitions are
/// `Pending → Approved` and `Pending → Rejected`.
///
/// The wire tokens (`"Pending"` capitalised, the other two lowercase) are
/// historical and load-bearing for existing consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionStatus {
  #[serde(rename = "Pending")]
  Pending,
  #[serde(rename = "approved")]
  Approved,
  #[serde(rename = "rejected")]
  Rejected,
}

impl AdmissionStatus {
  pub fn is_pending(self) -> bool { matches!(self, Self::Pending) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

impl fmt::Display for AdmissionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Fixed enumerations ──────────────────────────────────────────────────────

/// The class or entrance-exam track an applicant is applying for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLevel {
  #[serde(rename = "Class 6")]
  Class6,
  #[serde(rename = "Class 7")]
  Class7,
  #[serde(rename = "Class 8")]
  Class8,
  #[serde(rename = "Class 9")]
  Class9,
  #[serde(rename = "Class 10")]
  Class10,
  #[serde(rename = "Class 11")]
  Class11,
  #[serde(rename = "Class 12")]
  Class12,
  #[serde(rename = "JEE")]
  Jee,
  #[serde(rename = "NEET")]
  Neet,
}

impl ClassLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Class6 => "Class 6",
      Self::Class7 => "Class 7",
      Self::Class8 => "Class 8",
      Self::Class9 => "Class 9",
      Self::Class10 => "Class 10",
      Self::Class11 => "Class 11",
      Self::Class12 => "Class 12",
      Self::Jee => "JEE",
      Self::Neet => "NEET",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "Class 6" => Ok(Self::Class6),
      "Class 7" => Ok(Self::Class7),
      "Class 8" => Ok(Self::Class8),
      "Class 9" => Ok(Self::Class9),
      "Class 10" => Ok(Self::Class10),
      "Class 11" => Ok(Self::Class11),
      "Class 12" => Ok(Self::Class12),
      "JEE" => Ok(Self::Jee),
      "NEET" => Ok(Self::Neet),
      other => Err(Error::UnknownClassLevel(other.to_owned())),
    }
  }
}

/// A subject an applicant enrols in; at least one must be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectChoice {
  Physics,
  Chemistry,
  Maths,
  Biology,
}

impl SubjectChoice {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Physics => "Physics",
      Self::Chemistry => "Chemistry",
      Self::Maths => "Maths",
      Self::Biology => "Biology",
    }
  }
}

// ─── Application form ────────────────────────────────────────────────────────

/// The raw admission form as submitted — nothing validated yet.
///
/// String fields default to empty so an omitted field fails validation with
/// a named-field error rather than a deserialisation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
  pub first_name:       String,
  pub last_name:        String,
  pub blood_group:      String,
  pub dob:              String,
  pub email:            String,
  pub phone:            String,
  pub father_name:      String,
  pub father_phone:     String,
  pub mother_name:      String,
  pub mother_phone:     String,
  pub temp_address:     String,
  pub perm_address:     String,
  /// When set, the permanent address is the temporary address and any
  /// submitted `perm_address` value is ignored.
  pub same_address:     bool,
  pub class_level:      Option<ClassLevel>,
  pub subjects:         Vec<SubjectChoice>,
  pub gender:           String,
  pub alt_contact:      String,
  pub heard_from:       String,
  pub additional_notes: String,
  /// Public URL returned by the photo upload step.
  pub photo_url:        Option<String>,
}

impl ApplicationForm {
  /// Validate and normalise into an [`Application`].
  ///
  /// Required fields are checked in the documented order and the first
  /// failing field is named in the error. Optional fields normalise
  /// blank → `None`; nothing else is dropped.
  pub fn validate(self) -> Result<Application> {
    let required: [(&'static str, &str); 14] = [
      ("first_name", &self.first_name),
      ("last_name", &self.last_name),
      ("blood_group", &self.blood_group),
      ("dob", &self.dob),
      ("email", &self.email),
      ("phone", &self.phone),
      ("father_name", &self.father_name),
      ("father_phone", &self.father_phone),
      ("mother_name", &self.mother_name),
      ("mother_phone", &self.mother_phone),
      ("temp_address", &self.temp_address),
      ("class_level", self.class_level.map(ClassLevel::as_str).unwrap_or("")),
      ("gender", &self.gender),
      ("heard_from", &self.heard_from),
    ];
    for (name, value) in required {
      if value.trim().is_empty() {
        return Err(Error::MissingField(name));
      }
    }

    let photo_url = match self.photo_url.as_deref().map(str::trim) {
      Some(url) if !url.is_empty() => url.to_owned(),
      _ => return Err(Error::MissingPhoto),
    };

    if self.subjects.is_empty() {
      return Err(Error::NoSubjects);
    }

    let temp_address = self.temp_address.trim().to_owned();
    let perm_address = if self.same_address {
      Some(temp_address.clone())
    } else {
      non_blank(&self.perm_address)
    };

    Ok(Application {
      first_name: self.first_name.trim().to_owned(),
      last_name: self.last_name.trim().to_owned(),
      blood_group: self.blood_group.trim().to_owned(),
      dob: self.dob.trim().to_owned(),
      email: normalize_email(&self.email),
      phone: self.phone.trim().to_owned(),
      alt_contact: non_blank(&self.alt_contact),
      father_name: self.father_name.trim().to_owned(),
      father_phone: self.father_phone.trim().to_owned(),
      mother_name: self.mother_name.trim().to_owned(),
      mother_phone: self.mother_phone.trim().to_owned(),
      temp_address,
      perm_address,
      class_level: self.class_level.ok_or(Error::MissingField("class_level"))?,
      subjects: self.subjects,
      gender: self.gender.trim().to_owned(),
      heard_from: self.heard_from.trim().to_owned(),
      additional_notes: non_blank(&self.additional_notes),
      photo_url,
    })
  }
}

/// Trim, then map empty → `None`. Only applied to *optional* fields — a
/// required field that trims empty is a validation error, never a silent
/// drop.
fn non_blank(s: &str) -> Option<String> {
  let t = s.trim();
  (!t.is_empty()).then(|| t.to_owned())
}

// ─── Validated application ───────────────────────────────────────────────────

/// A validated, normalised admission application. Construction goes through
/// [`ApplicationForm::validate`]; every field here is known-good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
  pub first_name:       String,
  pub last_name:        String,
  pub blood_group:      String,
  pub dob:              String,
  /// Lowercase-trimmed; the durable join key across the whole system.
  pub email:            String,
  pub phone:            String,
  pub alt_contact:      Option<String>,
  pub father_name:      String,
  pub father_phone:     String,
  pub mother_name:      String,
  pub mother_phone:     String,
  pub temp_address:     String,
  pub perm_address:     Option<String>,
  pub class_level:      ClassLevel,
  pub subjects:         Vec<SubjectChoice>,
  pub gender:           String,
  pub heard_from:       String,
  pub additional_notes: Option<String>,
  pub photo_url:        String,
}

// ─── Applicant record ────────────────────────────────────────────────────────

/// The persisted applicant, tracked through the admission workflow.
///
/// `action_date`, `account_id` and `generated_password` are absent until a
/// decision; `account_id` and `generated_password` are set on approval only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantRecord {
  pub applicant_id: Uuid,

  #[serde(flatten)]
  pub application: Application,

  pub status:     AdmissionStatus,
  pub created_at: DateTime<Utc>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_date: Option<DateTime<Utc>>,

  /// Identity-provider account id, provisioned on approval.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub account_id: Option<Uuid>,

  /// Snapshot of the deterministic initial credential handed to the
  /// student. The identity store itself only ever holds a hash.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub generated_password: Option<String>,
}

impl ApplicantRecord {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.application.first_name, self.application.last_name)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
