//! SQL schema for the enroll SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per applicant for the whole admission lifecycle. The workflow
-- partitions (pending / approved / rejected) are values of `status`, so an
-- admission decision is a single guarded UPDATE, never a copy-then-delete.
CREATE TABLE IF NOT EXISTS applicants (
    applicant_id       TEXT PRIMARY KEY,
    first_name         TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    blood_group        TEXT NOT NULL,
    dob                TEXT NOT NULL,
    email              TEXT NOT NULL,   -- lowercase-trimmed
    phone              TEXT NOT NULL,
    alt_contact        TEXT,
    father_name        TEXT NOT NULL,
    father_phone       TEXT NOT NULL,
    mother_name        TEXT NOT NULL,
    mother_phone       TEXT NOT NULL,
    temp_address       TEXT NOT NULL,
    perm_address       TEXT,
    class_level        TEXT NOT NULL,   -- 'Class 6'..'Class 12' | 'JEE' | 'NEET'
    subjects           TEXT NOT NULL,   -- JSON array of subject names
    gender             TEXT NOT NULL,
    heard_from         TEXT NOT NULL,
    additional_notes   TEXT,
    photo_url          TEXT NOT NULL,
    status             TEXT NOT NULL DEFAULT 'Pending',
    created_at         TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    action_date        TEXT,            -- set by the admission decision
    account_id         TEXT,            -- set on approval only
    generated_password TEXT             -- credential snapshot, approval only
);

CREATE TABLE IF NOT EXISTS staff (
    staff_id         TEXT PRIMARY KEY,
    account_id       TEXT NOT NULL,
    first_name       TEXT NOT NULL,
    last_name        TEXT NOT NULL,
    name             TEXT NOT NULL,     -- denormalised 'First Last'
    email            TEXT NOT NULL UNIQUE,
    phone            TEXT NOT NULL,
    alt_phone        TEXT,
    dob              TEXT NOT NULL,
    gender           TEXT NOT NULL,
    blood_group      TEXT NOT NULL,
    teaching_class   TEXT NOT NULL,
    teaching_subject TEXT NOT NULL,
    designation      TEXT NOT NULL,
    temp_address     TEXT NOT NULL,
    perm_address     TEXT,
    created_at       TEXT NOT NULL
);

-- Feedback is append-only. No UPDATE or DELETE is ever issued.
CREATE TABLE IF NOT EXISTS feedback (
    feedback_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    photo_url   TEXT,
    message     TEXT NOT NULL,
    rating      INTEGER NOT NULL,
    posted_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_tickets (
    ticket_ref TEXT PRIMARY KEY,         -- human-facing, e.g. 'ENR-9F03A1'
    email      TEXT NOT NULL,
    subject    TEXT NOT NULL,
    message    TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'open',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS announcements (
    announcement_id TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    body            TEXT NOT NULL,
    posted_at       TEXT NOT NULL
);

-- Identity accounts; only ever holds the argon2 hash, never cleartext.
CREATE TABLE IF NOT EXISTS accounts (
    account_id      TEXT PRIMARY KEY,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,       -- PHC string, e.g. '$argon2id$v=19$...'
    created_at      TEXT NOT NULL,
    failed_attempts INTEGER NOT NULL DEFAULT 0,
    last_failed_at  TEXT
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(account_id),
    email      TEXT NOT NULL,
    opened_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS applicants_status_idx ON applicants(status);
CREATE INDEX IF NOT EXISTS applicants_email_idx  ON applicants(email);
CREATE INDEX IF NOT EXISTS sessions_account_idx  ON sessions(account_id);

PRAGMA user_version = 1;
";
