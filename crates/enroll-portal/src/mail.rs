//! Outbound mail delivery.
//!
//! [`LogMailer`] writes the message to the log instead of an external
//! delivery service; it stands in wherever real delivery is not configured.
//! Intake confirmation mail is sent best-effort: a delivery failure is
//! logged and the request still succeeds.

use enroll_core::mailer::{Mailer, OutboundMail};

/// A mailer that records deliveries in the tracing log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  type Error = std::convert::Infallible;

  async fn send(&self, mail: OutboundMail) -> Result<(), Self::Error> {
    tracing::info!(
      to = %mail.to_email,
      name = %mail.to_name,
      template = ?mail.template,
      "outbound mail"
    );
    Ok(())
  }
}

/// Send `mail`, logging a warning instead of failing the caller.
pub async fn send_best_effort<M: Mailer>(mailer: &M, mail: OutboundMail) {
  let to = mail.to_email.clone();
  if let Err(e) = mailer.send(mail).await {
    tracing::warn!(to = %to, error = %e, "mail delivery failed, continuing");
  }
}
