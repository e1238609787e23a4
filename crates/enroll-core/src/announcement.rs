//! Announcements posted by admins to the student dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
  pub title: String,
  pub body:  String,
}

impl NewAnnouncement {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.body.trim().is_empty() {
      return Err(Error::MissingField("body"));
    }
    Ok(())
  }
}

/// A persisted announcement; listed newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
  pub announcement_id: Uuid,
  pub title:           String,
  pub body:            String,
  pub posted_at:       DateTime<Utc>,
}
