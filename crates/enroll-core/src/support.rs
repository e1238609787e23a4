//! Support tickets raised from the student help centre.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Prefix on every human-facing ticket reference.
pub const TICKET_PREFIX: &str = "ENR-";

/// A ticket request before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
  pub email:   String,
  pub subject: String,
  pub message: String,
}

impl NewTicket {
  pub fn validate(&self) -> Result<()> {
    if self.subject.trim().is_empty() {
      return Err(Error::MissingField("subject"));
    }
    if self.message.trim().is_empty() {
      return Err(Error::MissingField("message"));
    }
    Ok(())
  }
}

/// A persisted support ticket. Created `"open"`; resolution happens outside
/// this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
  pub ticket_ref: String,
  pub email:      String,
  pub subject:    String,
  pub message:    String,
  pub status:     String,
  pub created_at: DateTime<Utc>,
}

/// Generate a fresh human-facing ticket reference, e.g. `ENR-9F03A1`.
pub fn ticket_ref() -> String {
  let hex = Uuid::new_v4().simple().to_string();
  format!("{TICKET_PREFIX}{}", hex[..6].to_uppercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ticket_ref_shape() {
    let r = ticket_ref();
    assert!(r.starts_with(TICKET_PREFIX));
    assert_eq!(r.len(), TICKET_PREFIX.len() + 6);
    assert!(r[TICKET_PREFIX.len()..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
  }

  #[test]
  fn blank_subject_rejected() {
    let t = NewTicket {
      email: "jane@example.com".into(),
      subject: " ".into(),
      message: "Help".into(),
    };
    assert!(matches!(t.validate(), Err(Error::MissingField("subject"))));
  }
}
