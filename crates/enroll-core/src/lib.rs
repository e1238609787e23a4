//! Core types for the enroll admission service: the application form and
//! its validation, the admission lifecycle engine, the session gate, and
//! the storage/identity/mail traits the other crates implement.
//!
//! Deliberately free of HTTP and database dependencies.

pub mod announcement;
pub mod applicant;
pub mod error;
pub mod feedback;
pub mod gate;
pub mod identity;
pub mod lifecycle;
pub mod mailer;
pub mod password;
pub mod staff;
pub mod store;
pub mod support;

pub use error::{Error, Result};
