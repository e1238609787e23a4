//! Staff records and the registration form.
//!
//! Staff are permanent once created — no lifecycle states, no deactivation
//! path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, gate::normalize_email};

/// Raw staff-registration form; validated into a [`StaffProfile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffForm {
  pub first_name:       String,
  pub last_name:        String,
  pub email:            String,
  pub phone:            String,
  pub alt_phone:        String,
  pub dob:              String,
  pub gender:           String,
  pub blood_group:      String,
  pub teaching_class:   String,
  pub teaching_subject: String,
  pub designation:      String,
  pub temp_address:     String,
  pub perm_address:     String,
  pub same_address:     bool,
}

impl StaffForm {
  pub fn validate(self) -> Result<StaffProfile> {
    let required: [(&'static str, &str); 11] = [
      ("first_name", &self.first_name),
      ("last_name", &self.last_name),
      ("email", &self.email),
      ("phone", &self.phone),
      ("dob", &self.dob),
      ("gender", &self.gender),
      ("blood_group", &self.blood_group),
      ("teaching_class", &self.teaching_class),
      ("teaching_subject", &self.teaching_subject),
      ("designation", &self.designation),
      ("temp_address", &self.temp_address),
    ];
    for (name, value) in required {
      if value.trim().is_empty() {
        return Err(Error::MissingField(name));
      }
    }

    let first_name = self.first_name.trim().to_owned();
    let last_name = self.last_name.trim().to_owned();
    let name = format!("{first_name} {last_name}");

    let temp_address = self.temp_address.trim().to_owned();
    let perm_address = if self.same_address {
      Some(temp_address.clone())
    } else {
      let t = self.perm_address.trim();
      (!t.is_empty()).then(|| t.to_owned())
    };

    let alt_phone = {
      let t = self.alt_phone.trim();
      (!t.is_empty()).then(|| t.to_owned())
    };

    Ok(StaffProfile {
      first_name,
      last_name,
      name,
      email: normalize_email(&self.email),
      phone: self.phone.trim().to_owned(),
      alt_phone,
      dob: self.dob.trim().to_owned(),
      gender: self.gender.trim().to_owned(),
      blood_group: self.blood_group.trim().to_owned(),
      teaching_class: self.teaching_class.trim().to_owned(),
      teaching_subject: self.teaching_subject.trim().to_owned(),
      designation: self.designation.trim().to_owned(),
      temp_address,
      perm_address,
    })
  }
}

/// A validated staff profile — everything but the ids and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfile {
  pub first_name:       String,
  pub last_name:        String,
  /// Joined "First Last", kept denormalised for display and mail.
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
}

/// A persisted staff member with their provisioned identity account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
  pub staff_id:   Uuid,
  pub account_id: Uuid,

  #[serde(flatten)]
  pub profile: StaffProfile,

  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filled_form() -> StaffForm {
    StaffForm {
      first_name: "Rakesh".into(),
      last_name: "Sharma".into(),
      email: "Rakesh@Example.com".into(),
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
  }

  #[test]
  fn joined_name_and_normalised_email() {
    let profile = filled_form().validate().unwrap();
    assert_eq!(profile.name, "Rakesh Sharma");
    assert_eq!(profile.email, "rakesh@example.com");
  }

  #[test]
  fn first_missing_field_is_named() {
    let mut form = filled_form();
    form.email.clear();
    assert!(matches!(form.validate(), Err(Error::MissingField("email"))));
  }

  #[test]
  fn same_address_copies_temporary() {
    let mut form = filled_form();
    form.same_address = true;
    let profile = form.validate().unwrap();
    assert_eq!(profile.perm_address.as_deref(), Some("4 Hill Street"));
  }
}
