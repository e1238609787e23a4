//! Session/identity gate — authentication plus roster authorisation.
//!
//! A valid credential alone is never sufficient: after every login the
//! email is checked against the roster for the claimed role, and a roster
//! miss signs the freshly created session straight back out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  identity::{AuthOutcome, IdentityProvider},
  store::AdmissionStore,
};

/// The role claimed at login. A UI toggle, not part of the credential — the
/// same email/password pair under the wrong role passes authentication and
/// fails the roster check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Admin,
}

impl Role {
  /// Portal landing page after a dual-pass login.
  pub fn landing_path(self) -> &'static str {
    match self {
      Self::Student => "/student",
      Self::Admin => "/admin",
    }
  }

  /// Wording used in the roster denial message.
  pub fn roster_label(self) -> &'static str {
    match self {
      Self::Student => "a STUDENT",
      Self::Admin => "an ADMIN",
    }
  }
}

/// A successful dual-pass login: live session plus roster identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginGrant {
  pub token:        Uuid,
  pub account_id:   Uuid,
  pub role:         Role,
  pub display_name: String,
  pub landing:      String,
}

/// Lowercase-trimmed form of an email — the join key used everywhere.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/// Authenticate `email`/`password` and authorise against the roster for
/// `role` (`admins` roster for [`Role::Admin`], the approved partition for
/// [`Role::Student`]).
///
/// On a roster miss the just-created session is signed out before the
/// denial is returned, so no session survives a failed authorisation.
pub async fn login<S, I>(
  store:    &S,
  identity: &I,
  email:    &str,
  password: &str,
  role:     Role,
) -> Result<LoginGrant>
where
  S: AdmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: IdentityProvider,
  I::Error: std::error::Error + Send + Sync + 'static,
{
  let email = normalize_email(email);

  let session = match identity
    .authenticate(&email, password)
    .await
    .map_err(Error::identity)?
  {
    AuthOutcome::Granted(session) => session,
    AuthOutcome::InvalidCredential => return Err(Error::InvalidCredential),
    AuthOutcome::TooManyAttempts => return Err(Error::TooManyAttempts),
  };

  let display_name = match role {
    Role::Admin => store
      .find_staff_by_email(&email)
      .await
      .map_err(Error::store)?
      .map(|staff| staff.profile.name),
    Role::Student => store
      .find_approved_by_email(&email)
      .await
      .map_err(Error::store)?
      .map(|applicant| applicant.display_name()),
  };

  match display_name {
    Some(display_name) => Ok(LoginGrant {
      token: session.token,
      account_id: session.account_id,
      role,
      display_name,
      landing: role.landing_path().to_owned(),
    }),
    None => {
      identity
        .sign_out(session.token)
        .await
        .map_err(Error::identity)?;
      Err(Error::NotOnRoster(role))
    }
  }
}
