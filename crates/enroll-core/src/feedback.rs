//! Student feedback — append-only, no edit or delete path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Rating rendered when a stored entry predates the rating field.
pub const DEFAULT_RATING: u8 = 5;

/// A feedback submission before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeedback {
  /// Display-name snapshot taken at submission time.
  pub name:      String,
  pub email:     String,
  pub photo_url: Option<String>,
  pub message:   String,
  /// 1–5 stars; clamped, and defaulted to [`DEFAULT_RATING`] when absent.
  pub rating:    Option<u8>,
}

impl NewFeedback {
  pub fn validate(&self) -> Result<()> {
    if self.message.trim().is_empty() {
      return Err(Error::MissingField("message"));
    }
    Ok(())
  }

  pub fn normalized_rating(&self) -> u8 {
    self.rating.unwrap_or(DEFAULT_RATING).clamp(1, 5)
  }
}

/// A persisted feedback entry; listed newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub feedback_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub photo_url:   Option<String>,
  pub message:     String,
  pub rating:      u8,
  pub posted_at:   DateTime<Utc>,
}
