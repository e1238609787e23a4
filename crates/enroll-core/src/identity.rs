//! The `IdentityProvider` trait — capability-scoped account provisioning
//! and session management.
//!
//! Provisioning a student account is a server-side call with elevated
//! privilege; the operator's own session is never touched.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token:      Uuid,
  pub account_id: Uuid,
  pub email:      String,
}

/// Result of an account-provisioning attempt. Semantic branches are typed
/// outcomes so generic callers can match on them; infrastructure failures
/// go through the provider's error type.
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
  Created(Uuid),
  /// The email is already a registered identity. Callers must abort before
  /// mutating anything else.
  EmailTaken,
}

/// Result of an authentication attempt.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
  Granted(Session),
  InvalidCredential,
  /// Consecutive failures tripped the throttle; distinct operator message.
  TooManyAttempts,
}

/// Abstraction over the identity provider.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Provision a new account under `email` with the given initial
  /// credential. The credential is hashed at rest; the caller keeps the
  /// cleartext if it needs to hand it to the user.
  fn create_account<'a>(
    &'a self,
    email:    &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<ProvisionOutcome, Self::Error>> + Send + 'a;

  /// Verify a credential and, on success, open a session.
  fn authenticate<'a>(
    &'a self,
    email:    &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<AuthOutcome, Self::Error>> + Send + 'a;

  /// Close a session. Unknown tokens are a no-op.
  fn sign_out(
    &self,
    token: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a bearer token to its live session, if any.
  fn session(
    &self,
    token: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;
}
