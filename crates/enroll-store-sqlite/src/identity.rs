//! [`IdentityProvider`] implementation over the `accounts` and `sessions`
//! tables.
//!
//! Credentials are stored as argon2 PHC strings. Failed logins are counted
//! per account; five failures inside a fifteen-minute window trip the
//! throttle and every further attempt is refused until the window lapses.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use enroll_core::identity::{AuthOutcome, IdentityProvider, ProvisionOutcome, Session};

use crate::{
  Error, Result, SqliteStore,
  encode::{RawSession, decode_dt, decode_uuid, encode_dt, encode_uuid},
};

const MAX_FAILED_ATTEMPTS: i64 = 5;
const THROTTLE_WINDOW_MINUTES: i64 = 15;

/// One `accounts` row, as needed by authentication.
struct RawAccount {
  account_id:      String,
  password_hash:   String,
  failed_attempts: i64,
  last_failed_at:  Option<String>,
}

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> Result<bool> {
  let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
  Ok(
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
  )
}

impl SqliteStore {
  async fn fetch_account(&self, email: String) -> Result<Option<RawAccount>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT account_id, password_hash, failed_attempts, last_failed_at
               FROM accounts WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawAccount {
                  account_id:      row.get(0)?,
                  password_hash:   row.get(1)?,
                  failed_attempts: row.get(2)?,
                  last_failed_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// Count a failed attempt. A failure after the window has lapsed starts a
  /// fresh count rather than extending a stale one.
  async fn record_failure(&self, account_id: String, fresh_window: bool) -> Result<()> {
    let now_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        if fresh_window {
          conn.execute(
            "UPDATE accounts SET failed_attempts = 1, last_failed_at = ?2
             WHERE account_id = ?1",
            rusqlite::params![account_id, now_str],
          )?;
        } else {
          conn.execute(
            "UPDATE accounts
             SET failed_attempts = failed_attempts + 1, last_failed_at = ?2
             WHERE account_id = ?1",
            rusqlite::params![account_id, now_str],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl IdentityProvider for SqliteStore {
  type Error = Error;

  async fn create_account(&self, email: &str, password: &str) -> Result<ProvisionOutcome> {
    let hash = hash_password(password)?;
    let email = email.to_owned();
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        // Check-then-insert runs on the store's single writer connection,
        // and the UNIQUE(email) constraint backstops it.
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if taken {
          return Ok(ProvisionOutcome::EmailTaken);
        }

        conn.execute(
          "INSERT INTO accounts (account_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email, hash, at_str],
        )?;
        Ok(ProvisionOutcome::Created(id))
      })
      .await?;

    Ok(outcome)
  }

  async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome> {
    let Some(account) = self.fetch_account(email.to_owned()).await? else {
      return Ok(AuthOutcome::InvalidCredential);
    };

    let window = Duration::minutes(THROTTLE_WINDOW_MINUTES);
    let in_window = match account.last_failed_at.as_deref() {
      Some(at) => Utc::now() - decode_dt(at)? < window,
      None => false,
    };

    if in_window && account.failed_attempts >= MAX_FAILED_ATTEMPTS {
      return Ok(AuthOutcome::TooManyAttempts);
    }

    if !verify_password(password, &account.password_hash)? {
      self.record_failure(account.account_id, !in_window).await?;
      return Ok(AuthOutcome::InvalidCredential);
    }

    let session = Session {
      token:      Uuid::new_v4(),
      account_id: decode_uuid(&account.account_id)?,
      email:      email.to_owned(),
    };

    let token_str   = encode_uuid(session.token);
    let account_str = account.account_id;
    let email_owned = session.email.clone();
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE accounts SET failed_attempts = 0, last_failed_at = NULL
           WHERE account_id = ?1",
          rusqlite::params![account_str],
        )?;
        conn.execute(
          "INSERT INTO sessions (token, account_id, email, opened_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_str, account_str, email_owned, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(AuthOutcome::Granted(session))
  }

  async fn sign_out(&self, token: Uuid) -> Result<()> {
    let token_str = encode_uuid(token);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token = ?1",
          rusqlite::params![token_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session(&self, token: Uuid) -> Result<Option<Session>> {
    let token_str = encode_uuid(token);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token, account_id, email FROM sessions WHERE token = ?1",
              rusqlite::params![token_str],
              |row| {
                Ok(RawSession {
                  token:      row.get(0)?,
                  account_id: row.get(1)?,
                  email:      row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }
}
