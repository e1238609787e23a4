//! SQLite backend for the enroll admission service.
//!
//! Implements both `AdmissionStore` and `IdentityProvider` over a single
//! database file, wrapped in [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime. Admission
//! records and identity accounts share one transactional store, which is
//! what makes the pending→decided move a single conditional update.

mod encode;
mod identity;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
