//! Outbound transactional mail.
//!
//! Templates are named with fixed variables, mirroring a hosted
//! template-based send API. Delivery failure after a successful record
//! write is non-fatal: there is no compensating transaction.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// The template to render, with its variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum MailTemplate {
  /// Sent to an applicant right after their pending record is written.
  AdmissionReceived,
  /// Sent to newly registered staff with their initial credential.
  StaffCredentials {
    password:    String,
    designation: String,
  },
}

/// One outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMail {
  pub to_name:  String,
  pub to_email: String,
  pub template: MailTemplate,
}

impl OutboundMail {
  pub fn admission_received(to_name: String, to_email: String) -> Self {
    Self { to_name, to_email, template: MailTemplate::AdmissionReceived }
  }

  pub fn staff_credentials(
    to_name:     String,
    to_email:    String,
    password:    String,
    designation: String,
  ) -> Self {
    Self {
      to_name,
      to_email,
      template: MailTemplate::StaffCredentials { password, designation },
    }
  }
}

/// Abstraction over the transactional email service.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send(
    &self,
    mail: OutboundMail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
